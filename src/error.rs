//! Error taxonomy for the batch read engine.
//!
//! Two failure shapes deliberately do NOT appear here: a call whose return
//! bytes cannot be interpreted surfaces as a `None` result slot (and
//! degrades to placeholder metadata downstream), and a pair probe answered
//! with a revert is the expected "not a pair" verdict. Both are ordinary
//! outcomes, not errors.

use alloy::primitives::Address;
use thiserror::Error;

/// Failures surfaced by the aggregation engine and its callers.
///
/// The enum is `Clone` so a single-flight fetch can hand the same failure
/// to every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A call could not be constructed from the supplied input
    /// (malformed endpoint URL or contract address in configuration).
    #[error("invalid {what} `{value}`")]
    Encoding { what: &'static str, value: String },

    /// The aggregator-level call for a chunk failed. The whole batch
    /// attempt fails and no partial chunk data is kept.
    #[error("multicall aggregation failed: {0}")]
    Aggregation(String),

    /// The aggregator answered with a result array that does not line up
    /// with the submitted chunk.
    #[error("aggregator returned {got} results for {expected} calls")]
    ResultShape { expected: usize, got: usize },

    /// A direct farm-contract query (pool count) failed.
    #[error("farm contract query failed: {0}")]
    Farm(String),

    /// A pair probe died on the wire before the contract could answer.
    /// Kept apart from the revert verdict so a transient RPC outage never
    /// classifies an address as "not a pair".
    #[error("pair probe transport fault for {address}: {reason}")]
    ProbeTransport { address: Address, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
