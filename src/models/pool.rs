use alloy::primitives::Address;

use super::token::AssetMetadata;

/// One farm pool row.
///
/// The pool set is rebuilt on explicit refresh and swapped in wholesale;
/// readers never observe a partially built list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Pool {
    pub pool_id: u64,
    /// The staked ("want") token, pair-extended when it is an LP token.
    pub asset: AssetMetadata,
    pub alloc_point: u64,
    pub last_reward_block: u64,
    /// Strategy contract the pool compounds through.
    pub strategy: Address,
}
