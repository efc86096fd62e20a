//! Operand adjustments applied before an operator body runs.
//!
//! Each stage is a plain function; operators compose the stages they need explicitly.

use crate::{Backend, BackendError, Datum, Expr, Value};
use strider_domain::bits::mask;
use strider_domain::{AbstractValue, BoolResult, StridedInterval};

/// Fail if the first operand is a bare integer
pub fn reject_raw_numeric(args: &[Value]) -> Result<(), BackendError> {
    match args.first() {
        Some(Value::Int(i)) => Err(BackendError::UnsupportedArgumentType(format!(
            "raw integer {i} where an abstract value is required"
        ))),
        _ => Ok(()),
    }
}

/// Two operands with the abstract one first
#[derive(Debug, Clone, Copy)]
pub struct Ordered<'a> {
    pub receiver: &'a AbstractValue,
    pub other: &'a Value,
    /// Whether the operands were swapped to put the abstract value first
    pub swapped: bool,
}

pub fn order_commutative(args: &[Value]) -> Result<Ordered<'_>, BackendError> {
    let [a, b] = args else {
        return Err(BackendError::UnsupportedArgumentCount(format!(
            "expected 2 arguments, got {}",
            args.len()
        )));
    };
    match (a, b) {
        (Value::Abstract(receiver), other) => Ok(Ordered {
            receiver,
            other,
            swapped: false,
        }),
        (other, Value::Abstract(receiver)) => {
            tracing::trace!("moving abstract operand into receiver position");
            Ok(Ordered {
                receiver,
                other,
                swapped: true,
            })
        }
        _ => Err(BackendError::UnsupportedArguments(format!(
            "neither {} nor {} is an abstract value",
            a.type_name(),
            b.type_name()
        ))),
    }
}

/// The bits of a raw integer taken at `bits`. Negative literals are read as two's complement;
/// anything outside `[signed_min_int(bits), max_int(bits)]` is rejected.
pub fn fit_literal(value: i128, bits: u32) -> Result<u128, BackendError> {
    let fits = value >= StridedInterval::signed_min_int(bits)
        && (value < 0 || value as u128 <= StridedInterval::max_int(bits));
    if !fits {
        return Err(BackendError::UnsupportedArgumentType(format!(
            "literal {value} does not fit in {bits} bits"
        )));
    }
    Ok((value as u128) & mask(bits))
}

pub fn coerce_bool(value: &Value) -> Result<BoolResult, BackendError> {
    value
        .as_bool()
        .ok_or_else(|| BackendError::UnsupportedType(value.type_name().to_string()))
}

pub fn coerce_bools(args: &[Value]) -> Result<Vec<BoolResult>, BackendError> {
    args.iter().map(coerce_bool).collect()
}

/// Replace concrete bit-vectors by their point intervals
pub fn promote_bitvecs(args: &[Datum]) -> Vec<Datum> {
    args.iter()
        .map(|a| match a {
            Datum::BitVec(bv) => Datum::Abstract(StridedInterval::from(*bv).into()),
            other => other.clone(),
        })
        .collect()
}

/// Run `body` on the un-reversed operands of `node` and reverse its result if any operand was
/// reversed.
pub fn unify_reversed(
    backend: &Backend,
    node: &Expr,
    body: impl FnOnce(&Expr) -> Result<AbstractValue, BackendError>,
) -> Result<AbstractValue, BackendError> {
    let mut any_reversed = false;
    let mut raw_args = Vec::with_capacity(node.args().len());
    for arg in node.args() {
        let value = match backend.convert(arg)? {
            Value::Abstract(v) if v.is_reversed() => {
                any_reversed = true;
                Value::Abstract(v.reversed_raw())
            }
            other => other,
        };
        raw_args.push(Datum::from(value));
    }
    let result = body(&node.swap_args(raw_args))?;
    if any_reversed {
        tracing::trace!(op = %node.op(), "re-reversing result of reversed operands");
        Ok(result.reverse()?)
    } else {
        Ok(result)
    }
}
