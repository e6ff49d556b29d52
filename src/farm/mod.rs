//! Farm state assembly: pool listing and per-holder stake positions.

pub mod service;

pub use service::FarmService;
