use alloy::primitives::Address;

/// ERC-20 metadata for a single address.
///
/// Immutable after the first successful fetch; once a record lands in the
/// registry cache it is never overwritten for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TokenMetadata {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenMetadata {
    pub fn new(address: Address, name: String, symbol: String, decimals: u8) -> Self {
        Self {
            address,
            name,
            symbol,
            decimals,
        }
    }

    /// Placeholder record for an address whose metadata could not be
    /// decoded. Never written to the cache, so a later fetch can still
    /// succeed.
    pub fn unknown(address: Address) -> Self {
        Self {
            address,
            name: "unknown".to_string(),
            symbol: "unknown".to_string(),
            decimals: 0,
        }
    }
}

/// Underlying token addresses of a liquidity pair.
///
/// Exists only for addresses the probe classified as pairs; keyed by the
/// pair address in the registry, alongside that address's own
/// [`TokenMetadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PairMetadata {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
}

/// Fully resolved metadata for a pair's two legs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PairComponents {
    pub token0: TokenMetadata,
    pub token1: TokenMetadata,
}

/// Metadata for a farm pool's staked asset: the token itself plus, when
/// the address is a liquidity pair, both legs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AssetMetadata {
    pub token: TokenMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pair: Option<PairComponents>,
}

impl AssetMetadata {
    pub fn plain(token: TokenMetadata) -> Self {
        Self { token, pair: None }
    }

    pub fn is_pair(&self) -> bool {
        self.pair.is_some()
    }
}
