//! The operator catalogue. Every module registers its operators with [`crate::register_op!`];
//! nothing here is called directly.

mod bits;
mod boolean;
mod compare;
mod control;
mod set;
#[cfg(test)]
mod tests;

use crate::normalize::fit_literal;
use crate::{Backend, BackendError, Datum, Expr, Op, Value};
use strider_domain::{AbstractValue, StridedInterval, bits::mask};

fn expect_abstract(op: Op, value: &Value) -> Result<&AbstractValue, BackendError> {
    value.as_abstract().ok_or_else(|| {
        BackendError::UnsupportedExprType(format!("{op} does not accept {}", value.type_name()))
    })
}

fn expect_int(op: Op, value: &Value) -> Result<i128, BackendError> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(BackendError::UnsupportedArgumentType(format!(
            "{op} expects an integer, got {}",
            other.type_name()
        ))),
    }
}

/// A bit count or bit position operand
fn expect_width(op: Op, value: &Value) -> Result<u32, BackendError> {
    let i = expect_int(op, value)?;
    u32::try_from(i).map_err(|_| {
        BackendError::UnsupportedArgumentType(format!("{op} got {i} as a bit count"))
    })
}

/// Two's complement truncation of a literal to `bits`
fn truncate(value: i128, bits: u32) -> u128 {
    (value as u128) & mask(bits)
}

/// The abstract form of `value` at `bits`: raw integers that fit the width become points
fn abstract_at(op: Op, value: &Value, bits: u32) -> Result<AbstractValue, BackendError> {
    match value {
        Value::Int(i) => Ok(StridedInterval::point(bits, fit_literal(*i, bits)?)?.into()),
        other => expect_abstract(op, other).cloned(),
    }
}

/// Convert every operand of `node`
fn convert_all(backend: &Backend, node: &Expr, args: &[Datum]) -> Result<Vec<Value>, BackendError> {
    tracing::trace!(op = %node.op(), count = args.len(), "converting operands");
    args.iter().map(|a| backend.convert(a)).collect()
}
