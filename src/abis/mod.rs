pub mod erc20;
pub mod farm;
pub mod multicall;
pub mod pair;

pub use erc20::IERC20;
pub use farm::IAutofarm;
pub use multicall::{Call3, IMulticall3, McResult};
pub use pair::IUniswapV2Pair;
