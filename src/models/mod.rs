pub mod pool;
pub mod position;
pub mod token;

pub use pool::Pool;
pub use position::{StakePosition, TokenBalance};
pub use token::{AssetMetadata, PairComponents, PairMetadata, TokenMetadata};
