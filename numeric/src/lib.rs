//! The `numeric` crate implements arithmetic on raw bit patterns in
//! three encodings: an arbitrary signed `Q(a,b)` fixed-point format
//! (two's complement, at most 32 bits wide) and IEEE-754-style half
//! and single precision binary floating point.  The idea is that a
//! driver (such as the `cli` crate) hands us already-parsed bit
//! patterns and we hand back the exact result pattern, plus a
//! canonical textual rendering of it.
//!
//! Every operation is a pure function from bit patterns to a bit
//! pattern; the only failure an operation can report is fixed-point
//! division by zero.  Floating-point division by zero is not an
//! error, it follows the usual signed-infinity and NaN rules.

mod bits;

pub mod error;
pub mod fixed;
pub mod float;

pub use crate::error::{DivisionByZero, QFormatError};
pub use crate::fixed::{FixedPoint, QFormat};
pub use crate::float::format::{FloatFormat, Half, Single};
pub use crate::float::BinaryFloat;

/// A half-precision value; 1 sign bit, 5 exponent bits, 10 mantissa bits.
pub type HalfFloat = BinaryFloat<Half>;

/// A single-precision value; 1 sign bit, 8 exponent bits, 23 mantissa bits.
pub type SingleFloat = BinaryFloat<Single>;
