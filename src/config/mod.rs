pub mod config;

pub use config::{FarmSettings, RpcSettings, Settings};
