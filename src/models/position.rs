use alloy::primitives::Address;

/// One component token of a staked position with its formatted share.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub address: Address,
    pub balance: String,
}

/// A holder's stake in one pool. Derived on every query, never persisted.
///
/// Amounts are fixed-point decimal strings scaled by the relevant token's
/// own decimal count; the reward uses the farm reward token's decimals.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StakePosition {
    pub pool_id: u64,
    /// Staked amount in units of the pool token.
    pub balance: String,
    /// Pending reward in units of the reward token.
    pub reward: String,
    /// Per-token breakdown: both legs for pair-backed pools, the pool
    /// token itself otherwise.
    pub tokens: Vec<TokenBalance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The HTTP layer serializes these records as-is; keep the wire shape
    // stable.
    #[test]
    fn position_serializes_with_flat_fields() {
        let position = StakePosition {
            pool_id: 7,
            balance: "5.0".to_string(),
            reward: "0.0".to_string(),
            tokens: vec![TokenBalance {
                symbol: "CAKE".to_string(),
                address: Address::repeat_byte(0x11),
                balance: "5.0".to_string(),
            }],
        };

        let json = serde_json::to_value(&position).unwrap();
        assert_eq!(json["pool_id"], 7);
        assert_eq!(json["balance"], "5.0");
        assert_eq!(json["reward"], "0.0");
        assert_eq!(json["tokens"][0]["symbol"], "CAKE");
        assert_eq!(
            json["tokens"][0]["address"],
            "0x1111111111111111111111111111111111111111"
        );
    }
}
