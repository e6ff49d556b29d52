//! Shared helpers for driving the engine against alloy's mock transport.

use alloy::primitives::{Bytes, U256};
use alloy::providers::mock::Asserter;
use alloy::providers::{DynProvider, ProviderBuilder};
use alloy::sol_types::SolValue;

use crate::abis::McResult;

pub(crate) fn mocked_provider(asserter: &Asserter) -> DynProvider {
    DynProvider::new(ProviderBuilder::new().connect_mocked_client(asserter.clone()))
}

/// A successful per-call slot carrying ABI-encoded return data.
pub(crate) fn call_ok(return_data: Vec<u8>) -> McResult {
    McResult {
        success: true,
        returnData: return_data.into(),
    }
}

/// A reverted per-call slot (aggregate3 with allowFailure).
pub(crate) fn call_failed() -> McResult {
    McResult {
        success: false,
        returnData: Bytes::new(),
    }
}

/// The raw `eth_call` return payload of one `aggregate3` invocation.
pub(crate) fn aggregate_payload(results: Vec<McResult>) -> Bytes {
    results.abi_encode().into()
}

/// Result slots for one address's `decimals`/`name`/`symbol` triple, in
/// canonical slot order.
pub(crate) fn metadata_slots(decimals: u8, name: &str, symbol: &str) -> Vec<McResult> {
    vec![
        call_ok(U256::from(decimals).abi_encode()),
        call_ok(name.to_string().abi_encode()),
        call_ok(symbol.to_string().abi_encode()),
    ]
}
