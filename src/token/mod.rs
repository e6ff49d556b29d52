//! Token metadata resolution: the pair probe and the memoizing registry.

pub mod classifier;
pub mod registry;

pub use classifier::PairProbe;
pub use registry::TokenRegistry;
