//! The batch execution engine.
//!
//! `execute` takes an ordered descriptor list of any size, partitions it
//! into bounded chunks, dispatches every chunk as one aggregator-contract
//! invocation (concurrently across chunks), and reassembles per-call
//! results in submission order. A chunk-level failure fails the whole
//! batch; a single call reverting or decoding badly only blanks its own
//! slot.

use alloy::primitives::Address;
use alloy::providers::DynProvider;
use futures::future;
use log::debug;

use super::descriptor::{CallDescriptor, CallReturn};
use crate::abis::{Call3, IMulticall3};
use crate::error::{Error, Result};

/// Default upper bound on calls per aggregator invocation.
pub const DEFAULT_CHUNK_CAPACITY: usize = 2000;

/// Client for the on-chain multicall aggregator contract.
#[derive(Clone)]
pub struct Multicall {
    address: Address,
    provider: DynProvider,
    chunk_capacity: usize,
}

impl Multicall {
    pub fn new(address: Address, provider: DynProvider) -> Self {
        Self {
            address,
            provider,
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
        }
    }

    /// Override the chunk capacity. Values below one are clamped to one.
    pub fn with_chunk_capacity(mut self, capacity: usize) -> Self {
        self.chunk_capacity = capacity.max(1);
        self
    }

    /// Execute every descriptor and return one decoded slot per call,
    /// aligned index-for-index with the input.
    pub async fn execute(&self, calls: &[CallDescriptor]) -> Result<Vec<Option<CallReturn>>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "aggregating {} call(s) in {} chunk(s)",
            calls.len(),
            calls.len().div_ceil(self.chunk_capacity)
        );

        let chunks = future::try_join_all(
            calls
                .chunks(self.chunk_capacity)
                .map(|chunk| self.execute_chunk(chunk)),
        )
        .await?;

        Ok(chunks.into_iter().flatten().collect())
    }

    async fn execute_chunk(&self, chunk: &[CallDescriptor]) -> Result<Vec<Option<CallReturn>>> {
        let aggregated: Vec<Call3> = chunk
            .iter()
            .map(|call| Call3 {
                target: call.target,
                allowFailure: true,
                callData: call.calldata(),
            })
            .collect();

        let contract = IMulticall3::new(self.address, &self.provider);
        let results = contract
            .aggregate3(aggregated)
            .call()
            .await
            .map_err(|err| Error::Aggregation(err.to_string()))?;

        if results.len() != chunk.len() {
            return Err(Error::ResultShape {
                expected: chunk.len(),
                got: results.len(),
            });
        }

        Ok(chunk
            .iter()
            .zip(results)
            .map(|(call, result)| {
                if result.success {
                    call.decode(&result.returnData)
                } else {
                    None
                }
            })
            .collect())
    }
}
