//! Exact fixed-point arithmetic for raw on-chain amounts.
//!
//! Everything here works on arbitrary-precision integers; floating point
//! never touches a balance.

use alloy::primitives::U256;
use num_bigint::BigUint;
use num_traits::Zero;

/// Convert an alloy U256 into a BigUint (via little-endian bytes).
pub fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_le(&value.to_le_bytes::<32>())
}

/// Format a raw token amount as a fixed-point decimal string.
///
/// Follows the `formatUnits` convention: the fractional part keeps at
/// least one digit and drops trailing zeros, so `5 * 10^18` at 18 decimals
/// renders as `"5.0"` and `1_500_000` at 6 decimals as `"1.5"`.
///
/// # Arguments
/// * `value` - The raw integer amount
/// * `decimals` - The token's decimal count
///
/// # Returns
/// * The scaled decimal string
pub fn format_units(value: &BigUint, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return format!("{digits}.0");
    }

    // Left-pad so at least one whole digit survives the split.
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let split = padded.len() - decimals;
    let whole = &padded[..split];
    let fraction = padded[split..].trim_end_matches('0');
    let fraction = if fraction.is_empty() { "0" } else { fraction };

    format!("{whole}.{fraction}")
}

/// Integer share of a pair reserve owned by `staked` LP tokens.
///
/// Computes `reserve * staked / total_supply` in arbitrary precision,
/// truncating toward zero. A zero total supply yields zero rather than a
/// division fault.
pub fn proportional_share(reserve: U256, staked: U256, total_supply: U256) -> BigUint {
    let total = u256_to_biguint(total_supply);
    if total.is_zero() {
        return BigUint::zero();
    }

    u256_to_biguint(reserve) * u256_to_biguint(staked) / total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(value: u128, decimals: u8) -> String {
        format_units(&BigUint::from(value), decimals)
    }

    #[test]
    fn format_trims_trailing_zeros_but_keeps_one_digit() {
        assert_eq!(units(5_000_000_000_000_000_000, 18), "5.0");
        assert_eq!(units(1_500_000, 6), "1.5");
        assert_eq!(units(0, 18), "0.0");
        assert_eq!(units(123, 0), "123.0");
    }

    #[test]
    fn format_keeps_full_precision_fractions() {
        assert_eq!(
            units(5_000_000_000_000_000_001, 18),
            "5.000000000000000001"
        );
        // Sub-unit amount: the whole part is a bare zero.
        assert_eq!(units(42, 18), "0.000000000000000042");
    }

    #[test]
    fn proportional_share_truncates_exactly() {
        let share = |r: u64, s: u64, t: u64| {
            proportional_share(U256::from(r), U256::from(s), U256::from(t))
        };

        assert_eq!(share(1000, 10, 100), BigUint::from(100u32));
        assert_eq!(share(2000, 10, 100), BigUint::from(200u32));
        // 7 * 10 / 3 = 23.33.. -> floor
        assert_eq!(share(7, 10, 3), BigUint::from(23u32));
        assert_eq!(share(1000, 10, 0), BigUint::zero());
    }

    #[test]
    fn proportional_share_survives_u256_scale_products() {
        // reserve near the uint112 ceiling times an 18-decimal stake would
        // overflow a 256-bit intermediate; BigUint must not.
        let reserve = U256::from(1u128 << 112) - U256::from(1u8);
        let staked = U256::from(10u8).pow(U256::from(30u8));
        let total = U256::from(10u8).pow(U256::from(30u8));

        assert_eq!(
            proportional_share(reserve, staked, total),
            u256_to_biguint(reserve)
        );
    }
}
