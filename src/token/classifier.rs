//! Speculative liquidity-pair detection.
//!
//! An address is a pair when both `token0()` and `token1()` answer. The
//! probes go directly to the address rather than through the batch
//! aggregator so a revert stays catchable per address. A revert (or an
//! answer the pair ABI cannot decode) is the expected "plain token"
//! verdict; only a wire-level fault is an error, so a flaky RPC can never
//! mislabel an address.

use alloy::primitives::Address;
use alloy::providers::DynProvider;
use log::info;

use crate::abis::IUniswapV2Pair;
use crate::error::{Error, Result};
use crate::models::PairMetadata;

#[derive(Clone)]
pub struct PairProbe {
    provider: DynProvider,
}

impl PairProbe {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    /// Probe `address` for the two pair accessors.
    ///
    /// Returns `Ok(Some(_))` when both answer, `Ok(None)` for the
    /// expected negative verdict, and `Err` only on a transport fault.
    pub async fn classify(&self, address: Address) -> Result<Option<PairMetadata>> {
        let pair = IUniswapV2Pair::new(address, &self.provider);
        let token0_call = pair.token0();
        let token1_call = pair.token1();
        let (token0, token1) = tokio::join!(token0_call.call(), token1_call.call());

        match (token0, token1) {
            (Ok(token0), Ok(token1)) => Ok(Some(PairMetadata {
                address,
                token0,
                token1,
            })),
            (Err(err), _) | (_, Err(err)) if is_rejection(&err) => {
                info!("address {address} is not a liquidity pair");
                Ok(None)
            }
            (Err(err), _) | (_, Err(err)) => Err(Error::ProbeTransport {
                address,
                reason: err.to_string(),
            }),
        }
    }
}

/// A node-level error response means the call executed and reverted; an
/// answer the ABI cannot decode means the accessor is not there. Anything
/// else never reached the contract.
fn is_rejection(err: &alloy::contract::Error) -> bool {
    match err {
        alloy::contract::Error::TransportError(transport) => transport.as_error_resp().is_some(),
        _ => true,
    }
}
