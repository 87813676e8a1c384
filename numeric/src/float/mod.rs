//! IEEE-754-style binary floating point implemented as pure integer
//! bit manipulation, generic over the format widths defined in
//! [`format`].
//!
//! Every bit pattern of a format classifies as exactly one of zero,
//! denormal, normal, infinity or NaN, with the sign orthogonal to all
//! five.  The arithmetic reduces each operation to a combination of
//! non-negative magnitudes plus a separately tracked sign, and funnels
//! every numeric intermediate through one shared renormalization
//! routine ([`BinaryFloat::construct`]), so that carry into the
//! exponent, overflow to infinity, and underflow into the denormal
//! range are handled in a single place.

use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;

use serde::Serialize;

use crate::bits::{low_mask, msb_index, normalizing_shift};

pub mod format;

use format::FloatFormat;


/// A binary floating-point value of format `F`, stored as its raw bit
/// pattern.
///
/// `PartialEq` compares bit patterns, not numeric values: `+0` and
/// `-0` are unequal, and a NaN is equal to itself.  That is the right
/// notion of equality for an engine whose contract is exact result
/// patterns.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BinaryFloat<F: FloatFormat> {
    bits: u32,
    format: PhantomData<F>,
}

/// The combine operator of the shared add/sub primitive.  Using an
/// explicit operator instead of mutual recursion between `add` and
/// `sub` keeps the sign reduction a single terminating step.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Combine {
    Add,
    Sub,
}

impl<F: FloatFormat> BinaryFloat<F> {
    /// Total container width: sign, exponent and mantissa fields.
    pub const BITS: u32 = 1 + F::EXPONENT_BITS + F::MANTISSA_BITS;

    const SIGN_BIT: u32 = 1 << (Self::BITS - 1);
    const MANT_MASK: u32 = low_mask(F::MANTISSA_BITS);
    const EXP_MASK: u32 = low_mask(F::EXPONENT_BITS) << F::MANTISSA_BITS;
    const ALL_BITS: u32 = Self::SIGN_BIT | Self::EXP_MASK | Self::MANT_MASK;

    /// The assumed-but-not-stored leading mantissa bit of a normal
    /// value.
    const IMPLICIT_BIT: u32 = 1 << F::MANTISSA_BITS;

    pub const BIAS: i32 = (1 << (F::EXPONENT_BITS - 1)) - 1;

    /// The exponent of the smallest normal value, which is also the
    /// exponent denormals are read with.
    pub const MIN_EXP: i32 = 1 - Self::BIAS;

    const MAX_EXP_FIELD: u32 = low_mask(F::EXPONENT_BITS);

    /// Left shift that puts the most significant stored mantissa bit
    /// on a nibble boundary for hex rendering: 1 for single, 2 for
    /// half.
    const HEX_ALIGN: u32 = 4 - F::MANTISSA_BITS % 4;
    const HEX_WIDTH: usize = ((F::MANTISSA_BITS + Self::HEX_ALIGN) / 4) as usize;

    pub const ZERO: Self = Self::from_parts(0);
    pub const NEG_ZERO: Self = Self::from_parts(Self::SIGN_BIT);
    pub const INFINITY: Self = Self::from_parts(Self::EXP_MASK);
    pub const NEG_INFINITY: Self = Self::from_parts(Self::SIGN_BIT | Self::EXP_MASK);

    /// The canonical NaN of the format: all-ones exponent field,
    /// all-ones mantissa field, positive sign.  Every operation with
    /// a NaN operand produces exactly this pattern.
    pub const NAN: Self = Self::from_parts(Self::EXP_MASK | Self::MANT_MASK);

    const fn from_parts(bits: u32) -> Self {
        BinaryFloat {
            bits,
            format: PhantomData,
        }
    }

    /// Builds a value from a raw bit pattern, keeping the low
    /// `1 + e + m` bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self::from_parts(bits & Self::ALL_BITS)
    }

    pub const fn to_bits(self) -> u32 {
        self.bits
    }

    const fn exponent_field(&self) -> u32 {
        (self.bits & Self::EXP_MASK) >> F::MANTISSA_BITS
    }

    const fn mantissa_field(&self) -> u32 {
        self.bits & Self::MANT_MASK
    }

    pub const fn is_negative(&self) -> bool {
        self.bits & Self::SIGN_BIT != 0
    }

    pub const fn is_zero(&self) -> bool {
        self.bits & !Self::SIGN_BIT == 0
    }

    pub const fn is_denormal(&self) -> bool {
        self.exponent_field() == 0 && self.mantissa_field() != 0
    }

    pub const fn is_normal(&self) -> bool {
        self.exponent_field() != 0 && self.exponent_field() != Self::MAX_EXP_FIELD
    }

    pub const fn is_infinite(&self) -> bool {
        self.exponent_field() == Self::MAX_EXP_FIELD && self.mantissa_field() == 0
    }

    pub const fn is_nan(&self) -> bool {
        self.exponent_field() == Self::MAX_EXP_FIELD && self.mantissa_field() != 0
    }

    /// Flips the sign bit.
    pub const fn negate(self) -> Self {
        Self::from_parts(self.bits ^ Self::SIGN_BIT)
    }

    /// Clears the sign bit.
    pub const fn magnitude(self) -> Self {
        Self::from_parts(self.bits & !Self::SIGN_BIT)
    }

    const fn signed_infinity(negative: bool) -> Self {
        if negative {
            Self::NEG_INFINITY
        } else {
            Self::INFINITY
        }
    }

    /// The true exponent.  A zero exponent field (zero or denormal)
    /// reads as the minimum normal exponent.
    const fn exponent(&self) -> i32 {
        let field = self.exponent_field();
        if field == 0 {
            Self::MIN_EXP
        } else {
            field as i32 - Self::BIAS
        }
    }

    /// The mantissa with the implicit leading bit re-inserted for
    /// normal values.  Only meaningful for finite values.
    const fn significand(&self) -> u32 {
        if self.exponent_field() == 0 {
            self.mantissa_field()
        } else {
            self.mantissa_field() | Self::IMPLICIT_BIT
        }
    }

    /// Magnitude/sign-aware order for finite values; infinities and
    /// NaNs must not reach this.  The two zeroes compare equal
    /// regardless of sign.
    fn less_than(self, other: Self) -> bool {
        if self.is_zero() && other.is_zero() {
            return false;
        }
        if self.is_negative() != other.is_negative() {
            return self.is_negative();
        }
        let invert = self.is_negative();
        if self.bits == other.bits {
            return false;
        }
        // Anything with a zero exponent field is below every normal
        // of the same sign, whatever the mantissa fields say.
        let self_small = self.exponent_field() == 0;
        let other_small = other.exponent_field() == 0;
        let magnitude_less = if self_small != other_small {
            self_small
        } else if self.exponent() != other.exponent() {
            self.exponent() < other.exponent()
        } else {
            self.mantissa_field() < other.mantissa_field()
        };
        magnitude_less ^ invert
    }

    /// The shared renormalization routine.  `wide` holds the result
    /// mantissa in units of `2^(exp - m)`: it may be wider than the
    /// `m + 1` significand bits (carry from addition, a double-width
    /// product) or narrower (cancellation during subtraction, a
    /// denormal operand).  Returns a non-negative pattern; the caller
    /// applies the sign.
    fn construct(exp: i32, wide: u64) -> Self {
        if wide == 0 {
            return Self::ZERO;
        }
        let m = F::MANTISSA_BITS as i32;
        let top = msb_index(wide);
        let true_exp = exp + top - m;
        if true_exp >= Self::MIN_EXP {
            // Normal candidate: bring the leading bit to the implicit
            // position, truncating anything shifted off the right.
            let mant = if top >= m {
                (wide >> (top - m)) as u32
            } else {
                (wide as u32) << (m - top)
            };
            let field = (true_exp + Self::BIAS) as u32;
            if field >= Self::MAX_EXP_FIELD {
                return Self::INFINITY;
            }
            Self::from_parts((field << F::MANTISSA_BITS) | (mant & Self::MANT_MASK))
        } else {
            // Underflow into the denormal range: position the mantissa
            // for a zero exponent field.
            let shift = Self::MIN_EXP - exp;
            if shift <= 0 {
                Self::from_parts((wide << shift.unsigned_abs()) as u32)
            } else if shift as u32 >= u64::BITS {
                Self::ZERO
            } else {
                Self::from_parts((wide >> shift as u32) as u32)
            }
        }
    }

    pub fn add(self, other: Self) -> Self {
        self.combine(other, Combine::Add)
    }

    pub fn sub(self, other: Self) -> Self {
        self.combine(other, Combine::Sub)
    }

    /// Signed-magnitude combine primitive behind `add` and `sub`.
    ///
    /// After the NaN and infinity tables, the operation is rewritten
    /// as a sum of two signed terms (`sub` flips the sign of its
    /// second term), which leaves four sign cases over non-negative
    /// magnitudes.
    fn combine(self, other: Self, op: Combine) -> Self {
        if self.is_nan() || other.is_nan() {
            return Self::NAN;
        }
        let rhs_negative = other.is_negative() ^ (op == Combine::Sub);
        if self.is_infinite() || other.is_infinite() {
            return match (self.is_infinite(), other.is_infinite()) {
                (true, true) => {
                    if self.is_negative() == rhs_negative {
                        Self::signed_infinity(self.is_negative())
                    } else {
                        // Opposite infinities cancelling is indeterminate.
                        Self::NAN
                    }
                }
                (true, false) => Self::signed_infinity(self.is_negative()),
                (false, true) => Self::signed_infinity(rhs_negative),
                (false, false) => unreachable!(),
            };
        }
        let x = self.magnitude();
        let y = other.magnitude();
        match (self.is_negative(), rhs_negative) {
            (false, false) => Self::mag_add(x, y),
            (true, true) => Self::mag_add(x, y).negate(),
            (false, true) => Self::mag_sub(x, y),
            (true, false) => Self::mag_sub(y, x),
        }
    }

    /// `a + b` for non-negative finite operands.
    fn mag_add(a: Self, b: Self) -> Self {
        if a.exponent_field() == 0 && b.exponent_field() == 0 {
            // Both below the normal range: native narrow addition is
            // exact, and a carry into the exponent field is exactly
            // the promotion to the smallest normal.
            return Self::from_parts(a.bits + b.bits);
        }
        let (a, b) = if a.exponent() < b.exponent() {
            (b, a)
        } else {
            (a, b)
        };
        let r = (a.exponent() - b.exponent()) as u32;
        if r >= Self::BITS {
            // The smaller operand is shifted out entirely.
            return a;
        }
        let aligned = u64::from(b.significand()) >> r;
        Self::construct(a.exponent(), u64::from(a.significand()) + aligned)
    }

    /// `a - b` for non-negative finite operands.  The result inherits
    /// the sign of the larger magnitude.
    fn mag_sub(a: Self, b: Self) -> Self {
        let negate_result = a.less_than(b);
        let (a, b) = if negate_result { (b, a) } else { (a, b) };
        let difference = if a.exponent_field() == 0 && b.exponent_field() == 0 {
            Self::from_parts(a.bits - b.bits)
        } else {
            let r = (a.exponent() - b.exponent()) as u32;
            if r >= Self::BITS {
                a
            } else {
                let aligned = u64::from(b.significand()) >> r;
                Self::construct(a.exponent(), u64::from(a.significand()) - aligned)
            }
        };
        if negate_result {
            difference.negate()
        } else {
            difference
        }
    }

    pub fn mul(self, other: Self) -> Self {
        if self.is_nan() || other.is_nan() {
            return Self::NAN;
        }
        if (self.is_infinite() && other.is_zero()) || (self.is_zero() && other.is_infinite()) {
            return Self::NAN;
        }
        let negative = self.is_negative() != other.is_negative();
        let product = Self::mag_mul(self.magnitude(), other.magnitude());
        if negative {
            product.negate()
        } else {
            product
        }
    }

    /// `a * b` for non-negative operands, NaN and the indeterminate
    /// zero-times-infinity already excluded.
    fn mag_mul(a: Self, b: Self) -> Self {
        if a.is_zero() || b.is_zero() {
            return Self::ZERO;
        }
        if a.is_infinite() || b.is_infinite() {
            return Self::INFINITY;
        }
        let product = u64::from(a.significand()) * u64::from(b.significand());
        // The double-width product is in units of 2^(exp - 2m);
        // lowering the exponent by m rescales it for construct.
        Self::construct(
            a.exponent() + b.exponent() - F::MANTISSA_BITS as i32,
            product,
        )
    }

    pub fn div(self, other: Self) -> Self {
        if self.is_nan() || other.is_nan() {
            return Self::NAN;
        }
        if self.is_zero() && other.is_zero() {
            return Self::NAN;
        }
        if self.is_infinite() && other.is_infinite() {
            return Self::NAN;
        }
        let negative = self.is_negative() != other.is_negative();
        let quotient = Self::mag_div(self.magnitude(), other.magnitude());
        if negative {
            quotient.negate()
        } else {
            quotient
        }
    }

    /// `a / b` for non-negative operands, the indeterminate cases
    /// already excluded.
    fn mag_div(a: Self, b: Self) -> Self {
        if a.is_zero() || b.is_infinite() {
            return Self::ZERO;
        }
        if a.is_infinite() || b.is_zero() {
            return Self::INFINITY;
        }
        // Widen the dividend by m bits so the quotient keeps a full
        // mantissa of fractional precision.
        let widened = u64::from(a.significand()) << F::MANTISSA_BITS;
        let quotient = widened / u64::from(b.significand());
        Self::construct(a.exponent() - b.exponent(), quotient)
    }
}

impl<F: FloatFormat> Display for BinaryFloat<F> {
    /// Renders the canonical hexadecimal-float form: `nan`, `inf`,
    /// `-inf`, a fixed all-zero literal per zero sign, or
    /// `0x1.<hex mantissa>p<exp>` with the exponent carrying an
    /// explicit `+` when non-negative.  Denormals are renormalized for
    /// display only.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_nan() {
            return f.write_str("nan");
        }
        if self.is_infinite() {
            return f.write_str(if self.is_negative() { "-inf" } else { "inf" });
        }
        if self.is_negative() {
            f.write_str("-")?;
        }
        let width = Self::HEX_WIDTH;
        if self.is_zero() {
            return write!(f, "0x0.{}p+0", "0".repeat(width));
        }
        let (exp, mant) = if self.is_denormal() {
            // Shift the leading bit up to the implicit position and
            // charge the shift to the exponent.
            let shift = normalizing_shift(self.mantissa_field(), F::MANTISSA_BITS);
            (
                Self::MIN_EXP - shift as i32,
                (self.mantissa_field() << shift) & Self::MANT_MASK,
            )
        } else {
            (self.exponent(), self.mantissa_field())
        };
        let aligned = mant << Self::HEX_ALIGN;
        if exp >= 0 {
            write!(f, "0x1.{aligned:0width$x}p+{exp}")
        } else {
            write!(f, "0x1.{aligned:0width$x}p{exp}")
        }
    }
}

impl<F: FloatFormat> Debug for BinaryFloat<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BinaryFloat<{}>{{bits: {:#0width$x}}}",
            F::NAME,
            self.bits,
            width = (Self::BITS / 4 + 2) as usize
        )
    }
}
