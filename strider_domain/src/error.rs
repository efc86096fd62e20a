use crate::Shape;
use thiserror::Error;

/// An error raised by an abstract value when an operation cannot be applied to it
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Two operands of a binary operation have different bit widths
    #[error("operand widths differ ({0} vs {1} bits)")]
    WidthMismatch(u32, u32),
    /// Widths are limited to what fits in a `u128`
    #[error("bit width {0} is outside of 1..=128")]
    InvalidWidth(u32),
    /// An extraction range that is inverted or does not fit in the value
    #[error("bit range [{high}:{low}] does not fit a {bits}-bit value")]
    InvalidBitRange { high: u32, low: u32, bits: u32 },
    /// A strided interval was constructed with `lower > upper`
    #[error("lower bound {lower:#x} exceeds upper bound {upper:#x}")]
    InvertedBounds { lower: u128, upper: u128 },
    /// Byte reversal of a value whose width is not a whole number of bytes
    #[error("cannot byte-reverse a {0}-bit value")]
    UnalignedReverse(u32),
    /// The operation has no meaning for the given abstract value shape
    #[error("{op} is not supported on {shape}")]
    UnsupportedShape { op: &'static str, shape: Shape },
}
