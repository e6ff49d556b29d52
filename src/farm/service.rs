//! The pool/position assembler.
//!
//! Orchestrates the descriptor builder, batch aggregator, and metadata
//! registry into the two domain queries: the farm's pool list and a
//! holder's per-pool staked/reward/underlying-token amounts.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, ProviderBuilder};
use anyhow::Context;
use log::{info, warn};
use rustc_hash::FxHashSet;
use tokio::sync::RwLock;
use url::Url;

use crate::abis::IAutofarm;
use crate::config::Settings;
use crate::error::Error;
use crate::models::{PairComponents, Pool, StakePosition, TokenBalance};
use crate::multicall::{sort_canonical, CallDescriptor, CallFunction, CallReturn, Multicall};
use crate::token::{PairProbe, TokenRegistry};
use crate::utils::{format_units, proportional_share, u256_to_biguint};

/// Decimals of the farm's reward token (AUTO).
const REWARD_DECIMALS: u8 = 18;

/// Staked-info calls per pool: pending reward and staked balance.
const STAKE_CALLS: usize = 2;

/// Reserve calls per pair: reserves and total supply.
const PAIR_CALLS: usize = 2;

/// Farm state reader.
///
/// The pool set is rebuilt on explicit refresh and swapped in wholesale,
/// so readers never observe a partially built list; between refreshes the
/// last successful build is served.
pub struct FarmService {
    farm_address: Address,
    provider: DynProvider,
    multicall: Arc<Multicall>,
    registry: TokenRegistry,
    dead_pools: FxHashSet<u64>,
    pools: RwLock<Arc<Vec<Pool>>>,
}

impl FarmService {
    /// Wire the full read stack from loaded settings.
    pub fn new(settings: &Settings) -> crate::Result<Self> {
        let endpoint = Url::parse(&settings.rpc.endpoint).map_err(|_| Error::Encoding {
            what: "rpc endpoint",
            value: settings.rpc.endpoint.clone(),
        })?;
        let provider = DynProvider::new(ProviderBuilder::new().connect_http(endpoint));

        let multicall_address =
            parse_address("multicall address", &settings.rpc.multicall_address)?;
        let farm_address = parse_address("farm address", &settings.farm.address)?;

        let multicall = Arc::new(
            Multicall::new(multicall_address, provider.clone())
                .with_chunk_capacity(settings.rpc.chunk_capacity),
        );
        let registry = TokenRegistry::new(Arc::clone(&multicall), PairProbe::new(provider.clone()));

        Ok(Self::with_parts(
            farm_address,
            provider,
            multicall,
            registry,
            settings.farm.dead_pools.iter().copied().collect(),
        ))
    }

    /// Assemble from pre-built collaborators (shared provider, aggregator,
    /// or registry).
    pub fn with_parts(
        farm_address: Address,
        provider: DynProvider,
        multicall: Arc<Multicall>,
        registry: TokenRegistry,
        dead_pools: FxHashSet<u64>,
    ) -> Self {
        Self {
            farm_address,
            provider,
            multicall,
            registry,
            dead_pools,
            pools: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// The last successfully built pool set (empty before the first
    /// refresh).
    pub async fn pools(&self) -> Arc<Vec<Pool>> {
        Arc::clone(&*self.pools.read().await)
    }

    /// Number of pools the farm reports.
    pub async fn pool_count(&self) -> crate::Result<u64> {
        let farm = IAutofarm::new(self.farm_address, &self.provider);
        let length = farm
            .poolLength()
            .call()
            .await
            .map_err(|err| Error::Farm(err.to_string()))?;
        Ok(u64::try_from(length).unwrap_or(u64::MAX))
    }

    /// Rebuild the pool set from chain state and return it.
    ///
    /// On any failure the previously cached set stays untouched.
    pub async fn refresh_pools(&self) -> anyhow::Result<Arc<Vec<Pool>>> {
        let count = self.pool_count().await.context("failed to query pool count")?;
        let pids = candidate_pool_ids(count, &self.dead_pools);

        let calls: Vec<CallDescriptor> = pids
            .iter()
            .map(|&pid| CallDescriptor::new(self.farm_address, CallFunction::PoolInfo { pid }))
            .collect();
        let results = self
            .multicall
            .execute(&calls)
            .await
            .context("pool info batch failed")?;

        // A pool whose registration row does not decode has no want
        // address to resolve; drop it from this build.
        let mut rows = Vec::with_capacity(pids.len());
        for (pid, result) in pids.iter().zip(results) {
            match result {
                Some(CallReturn::PoolInfo(pool_info)) => rows.push((*pid, pool_info)),
                _ => warn!("pool {pid}: undecodable pool info, skipping"),
            }
        }

        let wants: Vec<Address> = rows.iter().map(|(_, pool_info)| pool_info.want).collect();
        let assets = self
            .registry
            .resolve_batch(&wants)
            .await
            .context("want token resolution failed")?;

        let list: Vec<Pool> = rows
            .into_iter()
            .zip(assets)
            .map(|((pool_id, pool_info), asset)| Pool {
                pool_id,
                asset,
                alloc_point: pool_info.alloc_point,
                last_reward_block: pool_info.last_reward_block,
                strategy: pool_info.strategy,
            })
            .collect();

        info!("refreshed {} farm pool(s)", list.len());
        let list = Arc::new(list);
        *self.pools.write().await = Arc::clone(&list);
        Ok(list)
    }

    /// Current staked/reward state for `holder` across every pool.
    ///
    /// Pools where both the staked balance and the pending reward are zero
    /// are omitted. Pair-backed positions carry each leg's proportional
    /// share of the pair reserves.
    pub async fn positions(&self, holder: Address) -> anyhow::Result<Vec<StakePosition>> {
        let pools = {
            let current = self.pools().await;
            if current.is_empty() {
                self.refresh_pools().await?
            } else {
                current
            }
        };

        let calls = staked_info_calls(self.farm_address, holder, &pools);
        let results = self
            .multicall
            .execute(&calls)
            .await
            .context("staked info batch failed")?;
        let rows = stake_rows(&pools, &results);

        let pair_addresses: Vec<Address> = rows
            .iter()
            .filter(|row| row.pool.asset.is_pair())
            .map(|row| row.pool.asset.token.address)
            .collect();
        let reserve_results = if pair_addresses.is_empty() {
            Vec::new()
        } else {
            self.multicall
                .execute(&reserve_calls(&pair_addresses))
                .await
                .context("pair reserves batch failed")?
        };

        let mut positions = Vec::with_capacity(rows.len());
        let mut pair_index = 0usize;
        for row in rows {
            let asset = &row.pool.asset;
            let tokens = match &asset.pair {
                Some(components) => {
                    let slots =
                        &reserve_results[pair_index * PAIR_CALLS..(pair_index + 1) * PAIR_CALLS];
                    pair_index += 1;
                    pair_token_balances(components, row.staked, slots)
                }
                None => vec![TokenBalance {
                    symbol: asset.token.symbol.clone(),
                    address: asset.token.address,
                    balance: format_units(&u256_to_biguint(row.staked), asset.token.decimals),
                }],
            };

            positions.push(StakePosition {
                pool_id: row.pool.pool_id,
                balance: format_units(&u256_to_biguint(row.staked), asset.token.decimals),
                reward: format_units(&u256_to_biguint(row.reward), REWARD_DECIMALS),
                tokens,
            });
        }

        Ok(positions)
    }
}

struct StakeRow<'a> {
    pool: &'a Pool,
    staked: U256,
    reward: U256,
}

/// Pool ids eligible for listing: 1 through `count`, minus the deny list.
/// Slot 0 is the farm's own staking pool and never listed.
fn candidate_pool_ids(count: u64, dead_pools: &FxHashSet<u64>) -> Vec<u64> {
    (1..=count).filter(|pid| !dead_pools.contains(pid)).collect()
}

/// Two calls per pool, each pool's group sorted by function name so slot 0
/// is always the pending reward and slot 1 the staked balance.
fn staked_info_calls(farm: Address, holder: Address, pools: &[Pool]) -> Vec<CallDescriptor> {
    let mut calls = Vec::with_capacity(pools.len() * STAKE_CALLS);
    for pool in pools {
        let mut group = vec![
            CallDescriptor::new(
                farm,
                CallFunction::StakedBalance {
                    pid: pool.pool_id,
                    holder,
                },
            ),
            CallDescriptor::new(
                farm,
                CallFunction::PendingReward {
                    pid: pool.pool_id,
                    holder,
                },
            ),
        ];
        sort_canonical(&mut group);
        calls.extend(group);
    }
    calls
}

/// `getReserves`/`totalSupply` per pair, canonically sorted within each
/// group.
fn reserve_calls(pairs: &[Address]) -> Vec<CallDescriptor> {
    let mut calls = Vec::with_capacity(pairs.len() * PAIR_CALLS);
    for &pair in pairs {
        let mut group = vec![
            CallDescriptor::new(pair, CallFunction::PairTotalSupply),
            CallDescriptor::new(pair, CallFunction::PairReserves),
        ];
        sort_canonical(&mut group);
        calls.extend(group);
    }
    calls
}

/// Pair staked-info result slots with their pools, dropping rows where
/// both amounts are zero. Undecodable slots count as zero.
fn stake_rows<'a>(pools: &'a [Pool], results: &[Option<CallReturn>]) -> Vec<StakeRow<'a>> {
    pools
        .iter()
        .enumerate()
        .filter_map(|(index, pool)| {
            let base = index * STAKE_CALLS;
            let reward = match results.get(base) {
                Some(Some(CallReturn::PendingReward(value))) => *value,
                _ => U256::ZERO,
            };
            let staked = match results.get(base + 1) {
                Some(Some(CallReturn::StakedBalance(value))) => *value,
                _ => U256::ZERO,
            };

            if staked.is_zero() && reward.is_zero() {
                None
            } else {
                Some(StakeRow {
                    pool,
                    staked,
                    reward,
                })
            }
        })
        .collect()
}

/// Each leg's share of the pair reserves for `staked` LP tokens, formatted
/// with the leg's own decimals. Undecodable reserve slots yield zero
/// balances rather than failing the position.
fn pair_token_balances(
    components: &PairComponents,
    staked: U256,
    slots: &[Option<CallReturn>],
) -> Vec<TokenBalance> {
    let (reserve0, reserve1) = match slots.first() {
        Some(Some(CallReturn::Reserves { reserve0, reserve1 })) => (*reserve0, *reserve1),
        _ => (U256::ZERO, U256::ZERO),
    };
    let total_supply = match slots.get(1) {
        Some(Some(CallReturn::TotalSupply(value))) => *value,
        _ => U256::ZERO,
    };

    vec![
        TokenBalance {
            symbol: components.token0.symbol.clone(),
            address: components.token0.address,
            balance: format_units(
                &proportional_share(reserve0, staked, total_supply),
                components.token0.decimals,
            ),
        },
        TokenBalance {
            symbol: components.token1.symbol.clone(),
            address: components.token1.address,
            balance: format_units(
                &proportional_share(reserve1, staked, total_supply),
                components.token1.decimals,
            ),
        },
    ]
}

fn parse_address(what: &'static str, value: &str) -> crate::Result<Address> {
    value.parse().map_err(|_| Error::Encoding {
        what,
        value: value.to_string(),
    })
}
