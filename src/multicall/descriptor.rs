//! Typed call descriptors and their wire codec.
//!
//! Every supported read is a [`CallFunction`] variant that knows its own
//! calldata and the shape of its return, so decoding is checked per
//! function signature rather than unpacked from a generic value array. A
//! result that does not match its signature decodes to `None`, never to a
//! misread value.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;

use crate::abis::{IAutofarm, IUniswapV2Pair, IERC20};

/// The function behind a [`CallDescriptor`], with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallFunction {
    /// `name()` on an ERC-20 token.
    TokenName,
    /// `symbol()` on an ERC-20 token.
    TokenSymbol,
    /// `decimals()` on an ERC-20 token.
    TokenDecimals,
    /// `poolInfo(pid)` on the farm contract.
    PoolInfo { pid: u64 },
    /// `pendingAUTO(pid, user)` on the farm contract.
    PendingReward { pid: u64, holder: Address },
    /// `stakedWantTokens(pid, user)` on the farm contract.
    StakedBalance { pid: u64, holder: Address },
    /// `getReserves()` on a liquidity pair.
    PairReserves,
    /// `totalSupply()` on a liquidity pair.
    PairTotalSupply,
}

impl CallFunction {
    /// Solidity-level function name. Doubles as the canonical sort key
    /// when grouped calls must land in fixed result slots.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TokenName => "name",
            Self::TokenSymbol => "symbol",
            Self::TokenDecimals => "decimals",
            Self::PoolInfo { .. } => "poolInfo",
            Self::PendingReward { .. } => "pendingAUTO",
            Self::StakedBalance { .. } => "stakedWantTokens",
            Self::PairReserves => "getReserves",
            Self::PairTotalSupply => "totalSupply",
        }
    }

    fn calldata(&self) -> Bytes {
        match self {
            Self::TokenName => IERC20::nameCall {}.abi_encode().into(),
            Self::TokenSymbol => IERC20::symbolCall {}.abi_encode().into(),
            Self::TokenDecimals => IERC20::decimalsCall {}.abi_encode().into(),
            Self::PoolInfo { pid } => IAutofarm::poolInfoCall {
                pid: U256::from(*pid),
            }
            .abi_encode()
            .into(),
            Self::PendingReward { pid, holder } => IAutofarm::pendingAUTOCall {
                pid: U256::from(*pid),
                user: *holder,
            }
            .abi_encode()
            .into(),
            Self::StakedBalance { pid, holder } => IAutofarm::stakedWantTokensCall {
                pid: U256::from(*pid),
                user: *holder,
            }
            .abi_encode()
            .into(),
            Self::PairReserves => IUniswapV2Pair::getReservesCall {}.abi_encode().into(),
            Self::PairTotalSupply => IUniswapV2Pair::totalSupplyCall {}.abi_encode().into(),
        }
    }

    fn decode(&self, data: &[u8]) -> Option<CallReturn> {
        match self {
            Self::TokenName => IERC20::nameCall::abi_decode_returns(data)
                .ok()
                .map(CallReturn::Name),
            Self::TokenSymbol => IERC20::symbolCall::abi_decode_returns(data)
                .ok()
                .map(CallReturn::Symbol),
            Self::TokenDecimals => IERC20::decimalsCall::abi_decode_returns(data)
                .ok()
                .map(CallReturn::Decimals),
            Self::PoolInfo { .. } => IAutofarm::poolInfoCall::abi_decode_returns(data)
                .ok()
                .map(|info| {
                    CallReturn::PoolInfo(PoolInfoData {
                        want: info.want,
                        alloc_point: to_u64_saturating(info.allocPoint),
                        last_reward_block: to_u64_saturating(info.lastRewardBlock),
                        strategy: info.strat,
                    })
                }),
            Self::PendingReward { .. } => IAutofarm::pendingAUTOCall::abi_decode_returns(data)
                .ok()
                .map(CallReturn::PendingReward),
            Self::StakedBalance { .. } => IAutofarm::stakedWantTokensCall::abi_decode_returns(data)
                .ok()
                .map(CallReturn::StakedBalance),
            Self::PairReserves => IUniswapV2Pair::getReservesCall::abi_decode_returns(data)
                .ok()
                .map(|reserves| CallReturn::Reserves {
                    reserve0: reserves.reserve0,
                    reserve1: reserves.reserve1,
                }),
            Self::PairTotalSupply => IUniswapV2Pair::totalSupplyCall::abi_decode_returns(data)
                .ok()
                .map(CallReturn::TotalSupply),
        }
    }
}

/// Decoded return values, tagged by the function that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallReturn {
    Name(String),
    Symbol(String),
    Decimals(u8),
    PoolInfo(PoolInfoData),
    PendingReward(U256),
    StakedBalance(U256),
    Reserves { reserve0: U256, reserve1: U256 },
    TotalSupply(U256),
}

/// The farm's per-pool registration row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolInfoData {
    /// Address of the staked ("want") token.
    pub want: Address,
    pub alloc_point: u64,
    pub last_reward_block: u64,
    pub strategy: Address,
}

/// One read call: target contract plus typed function identity. Immutable
/// once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    pub target: Address,
    pub function: CallFunction,
}

impl CallDescriptor {
    pub fn new(target: Address, function: CallFunction) -> Self {
        Self { target, function }
    }

    /// ABI-encoded calldata for this call.
    pub fn calldata(&self) -> Bytes {
        self.function.calldata()
    }

    /// Decode return bytes according to the function's signature.
    /// `None` marks an uninterpretable result.
    pub fn decode(&self, data: &[u8]) -> Option<CallReturn> {
        self.function.decode(data)
    }
}

/// Sort descriptors by the canonical key (function name) so grouped calls
/// map to predictable result slots.
pub fn sort_canonical(calls: &mut [CallDescriptor]) {
    calls.sort_by_key(|call| call.function.name());
}

fn to_u64_saturating(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
