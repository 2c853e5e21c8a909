//! Constant variables.

/// Narrowest allowed identifier space.
pub const MIN_BITS: u32 = 1;
/// Widest identifier space whose ids still fit in `u32`.
pub const MAX_BITS: u32 = 31;
/// Identifier-space width used when none is configured.
pub const DEFAULT_BITS: u32 = 4;
/// Smallest meaningful branching order for the per-machine file index.
pub const MIN_ORDER: usize = 3;
/// Branching order used when none is configured.
pub const DEFAULT_ORDER: usize = 5;
