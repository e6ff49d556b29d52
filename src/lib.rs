pub mod abis;
pub mod config;
pub mod error;
pub mod farm;
pub mod models;
pub mod multicall;
pub mod token;
pub mod utils;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::Settings;
pub use error::{Error, Result};
pub use farm::FarmService;
pub use models::{
    AssetMetadata, PairComponents, PairMetadata, Pool, StakePosition, TokenBalance, TokenMetadata,
};
pub use multicall::{CallDescriptor, CallFunction, CallReturn, Multicall};
pub use token::{PairProbe, TokenRegistry};
