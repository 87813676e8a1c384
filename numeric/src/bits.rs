//! Bit-level helpers shared by the fixed-point and floating-point
//! engines.

/// Returns a mask covering the low `width` bits.  `width` may be the
/// full 32 bits, in which case a plain shift would overflow.
pub(crate) const fn low_mask(width: u32) -> u32 {
    if width >= u32::BITS {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

/// The index of the most significant set bit.  The caller must ensure
/// `x` is non-zero.
pub(crate) const fn msb_index(x: u64) -> i32 {
    (u64::BITS - 1 - x.leading_zeros()) as i32
}

/// How far `mant` must be shifted left so that its most significant
/// set bit lands at `target`, the implicit-bit position of a binary
/// format.  The caller must ensure `mant` is non-zero and fits below
/// `target` plus one.
pub(crate) const fn normalizing_shift(mant: u32, target: u32) -> u32 {
    mant.leading_zeros() - (u32::BITS - 1 - target)
}
