//! Numeric conversion and formatting utilities.

mod conversion;

pub use conversion::{format_units, proportional_share, u256_to_biguint};
