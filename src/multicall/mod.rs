//! Batched read-call aggregation: typed call descriptors plus the chunked
//! multicall execution engine.

pub mod aggregator;
pub mod descriptor;

pub use aggregator::{Multicall, DEFAULT_CHUNK_CAPACITY};
pub use descriptor::{sort_canonical, CallDescriptor, CallFunction, CallReturn, PoolInfoData};
