//! Signed fixed-point arithmetic in an arbitrary `Q(a,b)` format:
//! `a` integer bits (the top one being the sign under two's
//! complement), `b` fraction bits, `a + b` at most 32.  Values are
//! kept pre-masked to the low `a + b` bits of a `u32`; overflow wraps
//! silently, exactly as two's-complement modular arithmetic does.

use std::fmt::{self, Debug, Display, Formatter};

use serde::Serialize;

use crate::bits::low_mask;
use crate::error::{DivisionByZero, QFormatError};


/// A validated `Q(a,b)` format descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QFormat {
    int_bits: u32,
    frac_bits: u32,
}

impl QFormat {
    /// Checks the `Q(a,b)` preconditions: at least one bit on each
    /// side of the point, and a total width that fits the container.
    pub fn new(int_bits: u32, frac_bits: u32) -> Result<QFormat, QFormatError> {
        if int_bits == 0 {
            Err(QFormatError::NoIntegerBits)
        } else if frac_bits == 0 {
            Err(QFormatError::NoFractionBits)
        } else if int_bits
            .checked_add(frac_bits)
            .map_or(true, |total| total > u32::BITS)
        {
            Err(QFormatError::TooWide {
                int_bits,
                frac_bits,
            })
        } else {
            Ok(QFormat {
                int_bits,
                frac_bits,
            })
        }
    }

    pub const fn int_bits(&self) -> u32 {
        self.int_bits
    }

    pub const fn frac_bits(&self) -> u32 {
        self.frac_bits
    }

    pub const fn total_bits(&self) -> u32 {
        self.int_bits + self.frac_bits
    }

    const fn value_mask(&self) -> u32 {
        low_mask(self.total_bits())
    }

    const fn sign_bit(&self) -> u32 {
        1 << (self.total_bits() - 1)
    }
}

impl Debug for QFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Q({},{})", self.int_bits, self.frac_bits)
    }
}

/// A two's-complement fixed-point value in some [`QFormat`].
///
/// The stored bits are always pre-masked to the format width; there
/// are no stray high bits.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixedPoint {
    bits: u32,
    format: QFormat,
}

impl FixedPoint {
    /// Normalizes a raw bit pattern into the format by masking it to
    /// the low `a + b` bits.  There is no error condition; out-of-range
    /// patterns are taken modulo `2^(a+b)`.
    pub const fn from_raw(raw: u32, format: QFormat) -> FixedPoint {
        FixedPoint {
            bits: raw & format.value_mask(),
            format,
        }
    }

    pub const fn bits(&self) -> u32 {
        self.bits
    }

    pub const fn format(&self) -> QFormat {
        self.format
    }

    /// Tests the sign bit, bit `a + b - 1`.
    pub const fn is_negative(&self) -> bool {
        self.bits & self.format.sign_bit() != 0
    }

    /// Two's-complement negation.  The minimum value of the format
    /// (`-2^(a+b-1)`) negates to itself.
    pub const fn negate(self) -> FixedPoint {
        FixedPoint::from_raw(self.bits.wrapping_neg(), self.format)
    }

    /// The stored bits of the absolute value.  For the minimum value
    /// of the format this is the unchanged input, since its magnitude
    /// is not representable.
    const fn magnitude_bits(&self) -> u32 {
        if self.is_negative() {
            self.negate().bits
        } else {
            self.bits
        }
    }

    /// Modular addition; overflow wraps silently.
    pub fn wrapping_add(self, rhs: FixedPoint) -> FixedPoint {
        FixedPoint::from_raw(self.bits.wrapping_add(rhs.bits), self.format)
    }

    /// Modular subtraction; overflow wraps silently.
    pub fn wrapping_sub(self, rhs: FixedPoint) -> FixedPoint {
        FixedPoint::from_raw(self.bits.wrapping_sub(rhs.bits), self.format)
    }

    /// Sign-magnitude multiplication.  The operands are widened to a
    /// 64-bit product which is rescaled by `b` places; the dropped
    /// low bits are truncated, not rounded.
    pub fn mul(self, rhs: FixedPoint) -> FixedPoint {
        let negative = self.is_negative() != rhs.is_negative();
        let product = u64::from(self.magnitude_bits()) * u64::from(rhs.magnitude_bits());
        let rescaled = FixedPoint::from_raw((product >> self.format.frac_bits) as u32, self.format);
        if negative {
            rescaled.negate()
        } else {
            rescaled
        }
    }

    /// Sign-magnitude division.  The numerator is widened by `b`
    /// extra bits before the integer division so that fractional
    /// precision survives.  A zero divisor is the engine's only fatal
    /// condition.
    pub fn div(self, rhs: FixedPoint) -> Result<FixedPoint, DivisionByZero> {
        if rhs.bits == 0 {
            return Err(DivisionByZero);
        }
        let negative = self.is_negative() != rhs.is_negative();
        let widened = u64::from(self.magnitude_bits()) << self.format.frac_bits;
        let quotient = FixedPoint::from_raw(
            (widened / u64::from(rhs.magnitude_bits())) as u32,
            self.format,
        );
        Ok(if negative {
            quotient.negate()
        } else {
            quotient
        })
    }
}

impl Display for FixedPoint {
    /// Renders as `<int>.<3 decimal digits>`, e.g. `-3.500`.
    ///
    /// The minus sign is emitted only when the rendered magnitude is
    /// non-zero.  The minimum value of the format negates to itself,
    /// so its magnitude has nothing below the sign bit and renders as
    /// zero, without a spurious minus sign.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let b = self.format.frac_bits;
        let magnitude = self.magnitude_bits() & !self.format.sign_bit();
        let negative = self.is_negative() && magnitude != 0;
        let int_part = magnitude >> b;
        let fraction = u64::from(magnitude & low_mask(b));
        // fraction * 1000 / 2^b, as a multiply by 125 and a shift.
        let millis = if b >= 3 {
            (fraction * 125) >> (b - 3)
        } else {
            (fraction * 125) << (3 - b)
        };
        write!(
            f,
            "{}{}.{:03}",
            if negative { "-" } else { "" },
            int_part,
            millis
        )
    }
}

impl Debug for FixedPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixedPoint{{bits: {:#x}, format: {:?}}}",
            self.bits, self.format
        )
    }
}
