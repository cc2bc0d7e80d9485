//! Compile-time tuning for the container types.

/// Slot count of a freshly created or cleared table
pub const BASE_CAPACITY: usize = 8;

/// Load factor numerator; growth starts once `count / capacity >= 7 / 10`
pub const LOAD_FACTOR_NUM: usize = 7;

/// Load factor denominator
pub const LOAD_FACTOR_DEN: usize = 10;

/// Decimal places used when rendering floats for display, matching the
/// Arduino `String(float)` default
pub const FLOAT_DISPLAY_DECIMALS: usize = 2;
