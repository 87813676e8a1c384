//! Basic error reporting.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Represents a rejected `Q(a,b)` format descriptor.  The engine
/// itself never sees an invalid pair; construction of [`QFormat`]
/// fails first.
///
/// [`QFormat`]: crate::fixed::QFormat
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QFormatError {
    /// `a` was zero; at least the sign bit is needed.
    NoIntegerBits,
    /// `b` was zero.
    NoFractionBits,
    /// `a + b` exceeds the 32-bit container.
    TooWide { int_bits: u32, frac_bits: u32 },
}

impl Error for QFormatError {}

impl Display for QFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            QFormatError::NoIntegerBits => f.write_str("a fixed-point format needs at least one integer bit"),
            QFormatError::NoFractionBits => f.write_str("a fixed-point format needs at least one fraction bit"),
            QFormatError::TooWide {
                int_bits,
                frac_bits,
            } => write!(
                f,
                "fixed-point format Q({int_bits},{frac_bits}) does not fit in 32 bits"
            ),
        }
    }
}

/// The one unrecoverable condition in the engine: fixed-point
/// division by zero.  Floating-point division by zero is a defined
/// value (a signed infinity or NaN), never this error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DivisionByZero;

impl Error for DivisionByZero {}

impl Display for DivisionByZero {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str("division by zero")
    }
}
