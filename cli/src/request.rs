//! Validation and dispatch of one evaluation request.
//!
//! This is the boundary layer in front of the `numeric` crate: it
//! turns raw command-line tokens into a typed [`Request`] (rejecting
//! bad format selectors, rounding modes, hex literals and operator
//! tokens), selects the engine matching the format selector, and
//! renders the result.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use tracing::{event, Level};

use numeric::{BinaryFloat, DivisionByZero, FixedPoint, FloatFormat, Half, QFormat, Single};

/// A request the driver refused to dispatch.  Everything here is a
/// usage error; the engine never sees a malformed input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RequestError {
    BadFormat(String),
    BadRounding(String),
    BadHexLiteral(String),
    BadOperator(String),
    /// A request carries either one operand or an operator and two
    /// operands; nothing else.
    WrongArgumentCount(usize),
}

impl Error for RequestError {}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            RequestError::BadFormat(token) => write!(
                f,
                "bad format selector {token:?}: expected `h`, `f`, or `A.B` with 1 <= A, 1 <= B, A+B <= 32"
            ),
            RequestError::BadRounding(token) => {
                write!(f, "bad rounding mode {token:?}: expected 0, 1, 2 or 3")
            }
            RequestError::BadHexLiteral(token) => {
                write!(f, "bad hex literal {token:?}: expected 0x followed by hex digits")
            }
            RequestError::BadOperator(token) => {
                write!(f, "bad operator {token:?}: expected one of + - * /")
            }
            RequestError::WrongArgumentCount(count) => {
                write!(f, "expected 3 or 5 arguments, got {count}")
            }
        }
    }
}

/// The operator token of a two-operand request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl FromStr for Op {
    type Err = RequestError;

    fn from_str(token: &str) -> Result<Op, RequestError> {
        match token {
            "+" => Ok(Op::Add),
            "-" => Ok(Op::Sub),
            "*" => Ok(Op::Mul),
            "/" => Ok(Op::Div),
            _ => Err(RequestError::BadOperator(token.to_string())),
        }
    }
}

/// Which engine (and for fixed point, which `Q(a,b)` instantiation) a
/// request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatSelector {
    Fixed(QFormat),
    Half,
    Single,
}

impl FromStr for FormatSelector {
    type Err = RequestError;

    fn from_str(token: &str) -> Result<FormatSelector, RequestError> {
        match token {
            "h" => Ok(FormatSelector::Half),
            "f" => Ok(FormatSelector::Single),
            _ => parse_fixed_selector(token),
        }
    }
}

/// Parses an `A.B` fixed-point selector: exactly one dot with decimal
/// digits on both sides, and a pair that satisfies the `QFormat`
/// preconditions.
fn parse_fixed_selector(token: &str) -> Result<FormatSelector, RequestError> {
    let bad = || RequestError::BadFormat(token.to_string());
    let (int_part, frac_part) = token.split_once('.').ok_or_else(bad)?;
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    // A second dot ends up in frac_part and fails the digit check.
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(bad());
    }
    let int_bits = int_part.parse().map_err(|_| bad())?;
    let frac_bits = frac_part.parse().map_err(|_| bad())?;
    let format = QFormat::new(int_bits, frac_bits).map_err(|_| bad())?;
    Ok(FormatSelector::Fixed(format))
}

/// Validates the rounding-mode selector.  Modes 1-3 are accepted but
/// not implemented; the dispatcher warns and evaluates with mode 0.
pub fn parse_rounding(token: &str) -> Result<u8, RequestError> {
    match token {
        "0" => Ok(0),
        "1" => Ok(1),
        "2" => Ok(2),
        "3" => Ok(3),
        _ => Err(RequestError::BadRounding(token.to_string())),
    }
}

/// Parses a `0x`-prefixed hex literal.  Literals wider than the
/// 32-bit container keep their lowest 8 hex digits.
pub fn parse_hex(token: &str) -> Result<u32, RequestError> {
    let bad = || RequestError::BadHexLiteral(token.to_string());
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .ok_or_else(bad)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let tail = if digits.len() > 8 {
        &digits[digits.len() - 8..]
    } else {
        digits
    };
    u32::from_str_radix(tail, 16).map_err(|_| bad())
}

/// A fully validated request: render one operand, or apply an
/// operator to two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    pub format: FormatSelector,
    pub rounding: u8,
    pub first: u32,
    pub rest: Option<(Op, u32)>,
}

impl Request {
    /// Builds a request from the positional tokens: a format
    /// selector, a rounding mode, one operand, and optionally an
    /// operator with a second operand.
    pub fn from_tokens(
        format: &str,
        rounding: &str,
        operand: &str,
        rest: &[String],
    ) -> Result<Request, RequestError> {
        let format = format.parse()?;
        let rounding = parse_rounding(rounding)?;
        let first = parse_hex(operand)?;
        let rest = match rest {
            [] => None,
            [op, second] => Some((op.parse()?, parse_hex(second)?)),
            _ => return Err(RequestError::WrongArgumentCount(3 + rest.len())),
        };
        Ok(Request {
            format,
            rounding,
            first,
            rest,
        })
    }

    /// Dispatches the request to the matching engine and renders the
    /// result.  The only engine failure that can surface here is
    /// fixed-point division by zero.
    pub fn evaluate(&self) -> Result<String, DivisionByZero> {
        if self.rounding != 0 {
            event!(
                Level::WARN,
                "rounding mode {} is not implemented; evaluating with mode 0 (truncate)",
                self.rounding
            );
        }
        match self.format {
            FormatSelector::Fixed(format) => self.evaluate_fixed(format),
            FormatSelector::Half => Ok(self.evaluate_float::<Half>()),
            FormatSelector::Single => Ok(self.evaluate_float::<Single>()),
        }
    }

    fn evaluate_fixed(&self, format: QFormat) -> Result<String, DivisionByZero> {
        let first = FixedPoint::from_raw(self.first, format);
        let result = match self.rest {
            None => first,
            Some((op, raw)) => {
                let second = FixedPoint::from_raw(raw, format);
                match op {
                    Op::Add => first.wrapping_add(second),
                    Op::Sub => first.wrapping_sub(second),
                    Op::Mul => first.mul(second),
                    Op::Div => first.div(second)?,
                }
            }
        };
        Ok(result.to_string())
    }

    fn evaluate_float<F: FloatFormat>(&self) -> String {
        let first = BinaryFloat::<F>::from_bits(self.first);
        let result = match self.rest {
            None => first,
            Some((op, raw)) => {
                let second = BinaryFloat::<F>::from_bits(raw);
                match op {
                    Op::Add => first.add(second),
                    Op::Sub => first.sub(second),
                    Op::Mul => first.mul(second),
                    Op::Div => first.div(second),
                }
            }
        };
        result.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_parse_format_selector() {
        assert_eq!("h".parse(), Ok(FormatSelector::Half));
        assert_eq!("f".parse(), Ok(FormatSelector::Single));
        assert_eq!(
            "4.4".parse(),
            Ok(FormatSelector::Fixed(QFormat::new(4, 4).unwrap()))
        );
        assert_eq!(
            "16.16".parse(),
            Ok(FormatSelector::Fixed(QFormat::new(16, 16).unwrap()))
        );
        for bad in [
            "", "x", "44", ".4", "4.", "4.4.4", "4,4", "-4.4", "16.17",
            // Must fail the width check, not wrap its sum.
            "4294967295.1",
        ] {
            assert!(
                bad.parse::<FormatSelector>().is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rounding() {
        for (token, mode) in [("0", 0), ("1", 1), ("2", 2), ("3", 3)] {
            assert_eq!(parse_rounding(token), Ok(mode));
        }
        for bad in ["4", "-1", "00", "a", ""] {
            assert!(parse_rounding(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("0x0"), Ok(0));
        assert_eq!(parse_hex("0x3f800000"), Ok(0x3f80_0000));
        assert_eq!(parse_hex("0XDEAD"), Ok(0xdead));
        // An over-wide literal keeps its lowest 8 hex digits.
        assert_eq!(parse_hex("0x123456789"), Ok(0x2345_6789));
        assert_eq!(parse_hex("0xffff00000001"), Ok(0x0000_0001));
        for bad in ["", "0x", "3f800000", "0xg1", "0x12 34"] {
            assert!(parse_hex(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_operator() {
        assert_eq!("+".parse(), Ok(Op::Add));
        assert_eq!("-".parse(), Ok(Op::Sub));
        assert_eq!("*".parse(), Ok(Op::Mul));
        assert_eq!("/".parse(), Ok(Op::Div));
        assert!("%".parse::<Op>().is_err());
        assert!("++".parse::<Op>().is_err());
    }

    #[test]
    fn test_wrong_argument_count() {
        assert_eq!(
            Request::from_tokens("4.4", "0", "0x18", &strings(&["+"])),
            Err(RequestError::WrongArgumentCount(4))
        );
    }

    #[test]
    fn test_evaluate_fixed_identity() {
        let request = Request::from_tokens("4.4", "0", "0xc8", &[]).unwrap();
        assert_eq!(request.evaluate(), Ok("-3.500".to_string()));
    }

    #[test]
    fn test_evaluate_fixed_sum() {
        let request = Request::from_tokens("4.4", "0", "0x18", &strings(&["+", "0x08"])).unwrap();
        assert_eq!(request.evaluate(), Ok("2.000".to_string()));
    }

    #[test]
    fn test_evaluate_fixed_division_by_zero() {
        let request = Request::from_tokens("8.8", "0", "0x0100", &strings(&["/", "0x0"])).unwrap();
        assert_eq!(request.evaluate(), Err(DivisionByZero));
    }

    #[test]
    fn test_evaluate_single_identity() {
        let request = Request::from_tokens("f", "0", "0x3f800000", &[]).unwrap();
        assert_eq!(request.evaluate(), Ok("0x1.000000p+0".to_string()));
    }

    #[test]
    fn test_evaluate_half_sum() {
        let request = Request::from_tokens("h", "0", "0x0001", &strings(&["+", "0x0001"])).unwrap();
        assert_eq!(request.evaluate(), Ok("0x1.000p-23".to_string()));
    }

    #[test]
    fn test_evaluate_single_division_by_zero_is_not_an_error() {
        let request =
            Request::from_tokens("f", "0", "0xbf800000", &strings(&["/", "0x0"])).unwrap();
        assert_eq!(request.evaluate(), Ok("-inf".to_string()));
    }

    #[test]
    fn test_unimplemented_rounding_modes_evaluate_as_truncate() {
        let request = Request::from_tokens("4.4", "0", "0x18", &strings(&["+", "0x08"])).unwrap();
        let rounded = Request {
            rounding: 2,
            ..request
        };
        assert_eq!(rounded.evaluate(), request.evaluate());
    }
}
