use crate::normalize::coerce_bools;
use crate::{Backend, BackendError, Op, Value, register_op};
use std::ops::BitAnd;
use strider_domain::BoolResult;

/// Three-valued conjunction of one or more operands
fn and(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
    if args.is_empty() {
        return Err(BackendError::arity(Op::And, "at least 1", 0));
    }
    let bools = coerce_bools(args)?;
    Ok(bools
        .into_iter()
        .fold(BoolResult::True, BoolResult::bitand)
        .into())
}

fn not(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
    match coerce_bools(args)?.as_slice() {
        [a] => Ok((!*a).into()),
        other => Err(BackendError::arity(Op::Not, "1", other.len())),
    }
}

register_op!(raw Op::And => and);
register_op!(raw Op::Not => not);
