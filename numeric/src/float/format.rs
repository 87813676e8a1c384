//! Binary floating-point format descriptors.
//!
//! The arithmetic in [`super::BinaryFloat`] is one generic algorithm;
//! the types here are the configuration instances that pick the field
//! widths.  Everything else (bias, masks, the minimum normal
//! exponent) is derived from the two width constants.

use serde::Serialize;

/// Field widths of an IEEE-754-style binary format with one sign bit,
/// `EXPONENT_BITS` exponent bits and `MANTISSA_BITS` stored mantissa
/// bits, all within a 32-bit container.
pub trait FloatFormat: Copy {
    const EXPONENT_BITS: u32;
    const MANTISSA_BITS: u32;

    /// Short name used in diagnostics.
    const NAME: &'static str;
}

/// Half precision: 1 sign bit, 5 exponent bits, 10 mantissa bits,
/// bias 15.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Half;

impl FloatFormat for Half {
    const EXPONENT_BITS: u32 = 5;
    const MANTISSA_BITS: u32 = 10;
    const NAME: &'static str = "half";
}

/// Single precision: 1 sign bit, 8 exponent bits, 23 mantissa bits,
/// bias 127.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Single;

impl FloatFormat for Single {
    const EXPONENT_BITS: u32 = 8;
    const MANTISSA_BITS: u32 = 23;
    const NAME: &'static str = "single";
}
