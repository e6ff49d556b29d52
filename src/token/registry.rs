//! Memoizing token/pair metadata resolver.
//!
//! On-chain metadata is immutable, so cache entries live for the process
//! lifetime: the caches are unbounded and never evict. Uncached addresses
//! are classified and then fetched through ONE merged aggregator batch per
//! request, and an in-flight guard shares that work across concurrent
//! callers asking for the same address (single-flight). Records are
//! committed to the caches only when every piece decoded; placeholder
//! records are returned but never stored, so a later fetch can still
//! succeed.

use std::ops::Range;
use std::sync::Arc;

use alloy::primitives::Address;
use futures::future::{self, BoxFuture, Shared};
use futures::FutureExt;
use log::warn;
use moka::future::Cache;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;

use super::classifier::PairProbe;
use crate::error::Result;
use crate::models::{AssetMetadata, PairComponents, PairMetadata, TokenMetadata};
use crate::multicall::{sort_canonical, CallDescriptor, CallFunction, CallReturn, Multicall};

/// Calls fetched per address: `decimals`, `name`, `symbol`.
const METADATA_CALLS: usize = 3;

type SharedFetch = Shared<BoxFuture<'static, Result<AssetMetadata>>>;
type FetchMap = FxHashMap<Address, AssetMetadata>;

#[derive(Clone)]
enum Slot {
    Ready(AssetMetadata),
    Pending(SharedFetch),
}

#[derive(Clone)]
pub struct TokenRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    multicall: Arc<Multicall>,
    probe: PairProbe,
    tokens: Cache<Address, TokenMetadata>,
    /// Classification verdicts, negative ones included, so an address is
    /// probed at most once per process lifetime.
    verdicts: Cache<Address, Option<PairMetadata>>,
    /// Per-address single-flight guard: fetches currently on the wire.
    inflight: Mutex<FxHashMap<Address, SharedFetch>>,
}

impl TokenRegistry {
    pub fn new(multicall: Arc<Multicall>, probe: PairProbe) -> Self {
        Self {
            inner: Arc::new(Inner {
                multicall,
                probe,
                tokens: Cache::builder().build(),
                verdicts: Cache::builder().build(),
                inflight: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// Resolve metadata for a single address.
    pub async fn resolve(&self, address: Address) -> Result<AssetMetadata> {
        let mut batch = self.resolve_batch(std::slice::from_ref(&address)).await?;
        Ok(batch.pop().expect("batch of one yields one result"))
    }

    /// Resolve metadata for a batch of addresses, aligned index-for-index
    /// with the input.
    ///
    /// Cached addresses are answered without network access; the rest are
    /// deduplicated and fetched through a single merged aggregator batch.
    pub async fn resolve_batch(&self, addresses: &[Address]) -> Result<Vec<AssetMetadata>> {
        let mut claimed: Vec<Address> = Vec::new();
        let mut sources: FxHashMap<Address, Slot> = FxHashMap::default();

        {
            let mut inflight = self.inner.inflight.lock().await;

            for &address in addresses {
                if sources.contains_key(&address) || claimed.contains(&address) {
                    continue;
                }
                if let Some(asset) = self.inner.lookup(address).await {
                    sources.insert(address, Slot::Ready(asset));
                } else if let Some(shared) = inflight.get(&address) {
                    sources.insert(address, Slot::Pending(shared.clone()));
                } else {
                    claimed.push(address);
                }
            }

            if !claimed.is_empty() {
                let inner = Arc::clone(&self.inner);
                let targets = claimed.clone();
                let merged = async move { fetch_uncached(inner, targets).await.map(Arc::new) }
                    .boxed()
                    .shared();

                for &address in &claimed {
                    let merged = merged.clone();
                    let per_address: SharedFetch = async move {
                        let resolved = merged.await?;
                        Ok(resolved
                            .get(&address)
                            .cloned()
                            .expect("merged fetch resolves every claimed address"))
                    }
                    .boxed()
                    .shared();

                    inflight.insert(address, per_address.clone());
                    sources.insert(address, Slot::Pending(per_address));
                }
            }
        }

        // Await in input order; duplicates share their slot.
        let mut outcomes = Vec::with_capacity(addresses.len());
        for address in addresses {
            let slot = sources
                .get(address)
                .cloned()
                .expect("every address has a planned source");
            match slot {
                Slot::Ready(asset) => outcomes.push(Ok(asset)),
                Slot::Pending(shared) => outcomes.push(shared.await),
            }
        }

        // Our claims are settled either way; release them before
        // propagating any failure.
        if !claimed.is_empty() {
            let mut inflight = self.inner.inflight.lock().await;
            for address in &claimed {
                inflight.remove(address);
            }
        }

        outcomes.into_iter().collect()
    }
}

impl Inner {
    /// Answer from the caches alone. A cached answer exists only when the
    /// full pipeline committed: token metadata, a classification verdict,
    /// and both legs for pairs.
    async fn lookup(&self, address: Address) -> Option<AssetMetadata> {
        let token = self.tokens.get(&address).await?;
        match self.verdicts.get(&address).await? {
            None => Some(AssetMetadata::plain(token)),
            Some(pair) => {
                let token0 = self.tokens.get(&pair.token0).await?;
                let token1 = self.tokens.get(&pair.token1).await?;
                Some(AssetMetadata {
                    token,
                    pair: Some(PairComponents { token0, token1 }),
                })
            }
        }
    }

    /// Turn one address's slice of decoded slots into an asset record,
    /// writing through to the caches only when every piece decoded.
    async fn commit(
        &self,
        address: Address,
        verdict: Option<PairMetadata>,
        slots: &[Option<CallReturn>],
    ) -> AssetMetadata {
        let Some(token) = decode_metadata(address, &slots[..METADATA_CALLS]) else {
            warn!("invalid token metadata for {address}, serving placeholder");
            return AssetMetadata::plain(TokenMetadata::unknown(address));
        };

        let Some(pair) = verdict else {
            self.tokens.insert(address, token.clone()).await;
            self.verdicts.insert(address, None).await;
            return AssetMetadata::plain(token);
        };

        let token0 = decode_metadata(pair.token0, &slots[METADATA_CALLS..2 * METADATA_CALLS]);
        let token1 = decode_metadata(pair.token1, &slots[2 * METADATA_CALLS..]);

        match (token0, token1) {
            (Some(token0), Some(token1)) => {
                self.tokens.insert(pair.token0, token0.clone()).await;
                self.tokens.insert(pair.token1, token1.clone()).await;
                self.tokens.insert(address, token.clone()).await;
                self.verdicts.insert(address, Some(pair)).await;
                AssetMetadata {
                    token,
                    pair: Some(PairComponents { token0, token1 }),
                }
            }
            (token0, token1) => {
                warn!("invalid leg metadata for pair {address}, serving placeholders");
                AssetMetadata {
                    token,
                    pair: Some(PairComponents {
                        token0: token0.unwrap_or_else(|| TokenMetadata::unknown(pair.token0)),
                        token1: token1.unwrap_or_else(|| TokenMetadata::unknown(pair.token1)),
                    }),
                }
            }
        }
    }
}

/// Classify every claimed address, then fetch all metadata through one
/// merged aggregator batch.
async fn fetch_uncached(inner: Arc<Inner>, addresses: Vec<Address>) -> Result<FetchMap> {
    let verdicts = future::try_join_all(
        addresses
            .iter()
            .map(|&address| inner.probe.classify(address)),
    )
    .await?;

    // Pair addresses triple their descriptor footprint with both legs.
    let mut descriptors: Vec<CallDescriptor> = Vec::new();
    let mut layout: Vec<(Address, Option<PairMetadata>, Range<usize>)> = Vec::new();
    for (&address, verdict) in addresses.iter().zip(&verdicts) {
        let start = descriptors.len();
        descriptors.extend(metadata_calls(address));
        if let Some(pair) = verdict {
            descriptors.extend(metadata_calls(pair.token0));
            descriptors.extend(metadata_calls(pair.token1));
        }
        layout.push((address, *verdict, start..descriptors.len()));
    }

    let results = inner.multicall.execute(&descriptors).await?;

    let mut resolved = FetchMap::default();
    for (address, verdict, range) in layout {
        let asset = inner.commit(address, verdict, &results[range]).await;
        resolved.insert(address, asset);
    }
    Ok(resolved)
}

/// The three metadata calls for one address, in canonical slot order.
fn metadata_calls(address: Address) -> Vec<CallDescriptor> {
    let mut calls = vec![
        CallDescriptor::new(address, CallFunction::TokenName),
        CallDescriptor::new(address, CallFunction::TokenSymbol),
        CallDescriptor::new(address, CallFunction::TokenDecimals),
    ];
    sort_canonical(&mut calls);
    calls
}

/// Decode a `decimals`/`name`/`symbol` slot group. All three must decode;
/// otherwise the whole record counts as unknown.
fn decode_metadata(address: Address, slots: &[Option<CallReturn>]) -> Option<TokenMetadata> {
    match slots {
        [Some(CallReturn::Decimals(decimals)), Some(CallReturn::Name(name)), Some(CallReturn::Symbol(symbol))] => {
            Some(TokenMetadata::new(
                address,
                name.clone(),
                symbol.clone(),
                *decimals,
            ))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{
        aggregate_payload, call_failed, metadata_slots, mocked_provider,
    };
    use alloy::primitives::Bytes;
    use alloy::providers::mock::Asserter;
    use alloy::sol_types::SolValue;

    fn mocked_registry(asserter: &Asserter) -> TokenRegistry {
        let provider = mocked_provider(asserter);
        let multicall = Arc::new(Multicall::new(Address::repeat_byte(0x11), provider.clone()));
        TokenRegistry::new(multicall, PairProbe::new(provider))
    }

    fn push_not_a_pair(asserter: &Asserter) {
        asserter.push_failure_msg("execution reverted");
        asserter.push_failure_msg("execution reverted");
    }

    #[tokio::test]
    async fn second_resolve_is_answered_from_the_cache() {
        let address = Address::repeat_byte(0xaa);
        let asserter = Asserter::new();
        push_not_a_pair(&asserter);
        asserter.push_success(&aggregate_payload(metadata_slots(18, "Wrapped BNB", "WBNB")));

        let registry = mocked_registry(&asserter);

        let first = registry.resolve(address).await.unwrap();
        assert_eq!(first.token.symbol, "WBNB");
        assert_eq!(first.token.decimals, 18);
        assert!(!first.is_pair());

        // No responses queued: any further request would fail.
        let second = registry.resolve(address).await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn concurrent_resolves_share_one_fetch() {
        let address = Address::repeat_byte(0xaa);
        let asserter = Asserter::new();
        push_not_a_pair(&asserter);
        asserter.push_success(&aggregate_payload(metadata_slots(18, "Wrapped BNB", "WBNB")));

        let registry = mocked_registry(&asserter);

        let (a, b, c) = tokio::join!(
            registry.resolve(address),
            registry.resolve(address),
            registry.resolve(address),
        );
        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a, c.unwrap());
    }

    #[tokio::test]
    async fn batch_deduplicates_repeated_addresses() {
        let first = Address::repeat_byte(0xaa);
        let second = Address::repeat_byte(0xbb);

        let asserter = Asserter::new();
        push_not_a_pair(&asserter);
        push_not_a_pair(&asserter);
        let mut slots = metadata_slots(18, "Token A", "AAA");
        slots.extend(metadata_slots(6, "Token B", "BBB"));
        asserter.push_success(&aggregate_payload(slots));

        let registry = mocked_registry(&asserter);
        let assets = registry
            .resolve_batch(&[first, second, first])
            .await
            .unwrap();

        assert_eq!(assets.len(), 3);
        assert_eq!(assets[0].token.symbol, "AAA");
        assert_eq!(assets[1].token.symbol, "BBB");
        assert_eq!(assets[0], assets[2]);
    }

    #[tokio::test]
    async fn pair_addresses_resolve_both_legs() {
        let pair = Address::repeat_byte(0xcc);
        let token0 = Address::repeat_byte(0xa0);
        let token1 = Address::repeat_byte(0xa1);

        let asserter = Asserter::new();
        asserter.push_success(&Bytes::from(token0.abi_encode()));
        asserter.push_success(&Bytes::from(token1.abi_encode()));
        let mut slots = metadata_slots(18, "Pancake LPs", "Cake-LP");
        slots.extend(metadata_slots(18, "Wrapped BNB", "WBNB"));
        slots.extend(metadata_slots(18, "PancakeSwap Token", "CAKE"));
        asserter.push_success(&aggregate_payload(slots));

        let registry = mocked_registry(&asserter);
        let asset = registry.resolve(pair).await.unwrap();

        assert_eq!(asset.token.symbol, "Cake-LP");
        let components = asset.pair.as_ref().unwrap();
        assert_eq!(components.token0.address, token0);
        assert_eq!(components.token0.symbol, "WBNB");
        assert_eq!(components.token1.symbol, "CAKE");

        // Cached as a pair: the second resolve needs no probe and no fetch.
        let again = registry.resolve(pair).await.unwrap();
        assert_eq!(again, asset);
    }

    #[tokio::test]
    async fn undecodable_metadata_degrades_without_caching() {
        let address = Address::repeat_byte(0xaa);

        let asserter = Asserter::new();
        push_not_a_pair(&asserter);
        asserter.push_success(&aggregate_payload(vec![
            call_failed(),
            metadata_slots(18, "Token A", "AAA")[1].clone(),
            metadata_slots(18, "Token A", "AAA")[2].clone(),
        ]));

        let registry = mocked_registry(&asserter);
        let placeholder = registry.resolve(address).await.unwrap();
        assert_eq!(placeholder.token.symbol, "unknown");
        assert_eq!(placeholder.token.decimals, 0);

        // Nothing was cached, so the next resolve fetches again and can
        // succeed this time.
        push_not_a_pair(&asserter);
        asserter.push_success(&aggregate_payload(metadata_slots(18, "Token A", "AAA")));
        let real = registry.resolve(address).await.unwrap();
        assert_eq!(real.token.symbol, "AAA");
    }

    #[tokio::test]
    async fn one_bad_address_does_not_poison_the_batch() {
        let good = Address::repeat_byte(0xaa);
        let bad = Address::repeat_byte(0xbb);

        let asserter = Asserter::new();
        push_not_a_pair(&asserter);
        push_not_a_pair(&asserter);
        let mut slots = metadata_slots(18, "Token A", "AAA");
        slots.extend(vec![call_failed(), call_failed(), call_failed()]);
        asserter.push_success(&aggregate_payload(slots));

        let registry = mocked_registry(&asserter);
        let assets = registry.resolve_batch(&[good, bad]).await.unwrap();

        assert_eq!(assets[0].token.symbol, "AAA");
        assert_eq!(assets[1].token.symbol, "unknown");
    }
}
