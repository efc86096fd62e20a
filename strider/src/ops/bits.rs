use super::{abstract_at, convert_all, expect_abstract, expect_width};
use crate::normalize::{promote_bitvecs, reject_raw_numeric};
use crate::{Backend, BackendError, Expr, Op, Value, register_op};
use strider_domain::{AbstractValue, StridedInterval};

/// A shift amount at the width of the shifted value. Literals of at least the width shift
/// every bit out, so they saturate to the width itself.
fn shift_amount(amount: &Value, bits: u32) -> Result<AbstractValue, BackendError> {
    match amount {
        Value::Int(i) if *i < 0 => Err(BackendError::UnsupportedArgumentType(format!(
            "{} by a negative amount {i}",
            Op::LShR
        ))),
        Value::Int(i) => {
            let saturated = (*i as u128).min(u128::from(bits));
            Ok(StridedInterval::point(bits, saturated)?.into())
        }
        other => abstract_at(Op::LShR, other, bits),
    }
}

/// `LShR(expr, amount)`; a literal amount is taken at the width of `expr`
fn lshr(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
    let [expr, amount] = args else {
        return Err(BackendError::arity(Op::LShR, "2", args.len()));
    };
    let expr = expect_abstract(Op::LShR, expr)?;
    let amount = shift_amount(amount, expr.bits())?;
    Ok(expr.lshr(&amount)?.into())
}

/// Operands of `node` with concrete bit-vectors promoted to points, then converted
fn promoted_args(backend: &Backend, node: &Expr) -> Result<Vec<Value>, BackendError> {
    convert_all(backend, node, &promote_bitvecs(node.args()))
}

/// `Concat(a, b, ...)`, most significant operand first
fn concat(backend: &Backend, node: &Expr) -> Result<Value, BackendError> {
    let args = promoted_args(backend, node)?;
    let mut parts = args.iter().map(|a| expect_abstract(Op::Concat, a));
    let first = parts
        .next()
        .ok_or_else(|| BackendError::arity(Op::Concat, "at least 1", 0))??;
    let joined = parts.try_fold(first.clone(), |acc, part| -> Result<AbstractValue, BackendError> {
        Ok(acc.concat(part?)?)
    })?;
    Ok(joined.into())
}

/// `Extract(high, low, expr)`: bits `[low, high]` inclusive, counted from the least significant
fn extract(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
    let [high, low, expr] = args else {
        return Err(BackendError::arity(Op::Extract, "3", args.len()));
    };
    reject_raw_numeric(std::slice::from_ref(expr))?;
    let expr = expect_abstract(Op::Extract, expr)?;
    let (high, low) = (expect_width(Op::Extract, high)?, expect_width(Op::Extract, low)?);
    Ok(expr.extract(high, low)?.into())
}

/// Operands of `SignExt`/`ZeroExt`: the number of added bits and the value. The value is
/// extended to the sum of the two widths.
fn extension(backend: &Backend, node: &Expr) -> Result<(u32, AbstractValue), BackendError> {
    let args = promoted_args(backend, node)?;
    let [added, expr] = args.as_slice() else {
        return Err(BackendError::arity(node.op(), "2", args.len()));
    };
    let added = expect_width(node.op(), added)?;
    let expr = expect_abstract(node.op(), expr)?;
    let total = added.checked_add(expr.bits()).ok_or_else(|| {
        BackendError::UnsupportedArgumentType(format!("{} cannot add {added} bits", node.op()))
    })?;
    Ok((total, expr.clone()))
}

fn sign_ext(backend: &Backend, node: &Expr) -> Result<Value, BackendError> {
    let (total, expr) = extension(backend, node)?;
    Ok(expr.sign_extend(total)?.into())
}

fn zero_ext(backend: &Backend, node: &Expr) -> Result<Value, BackendError> {
    let (total, expr) = extension(backend, node)?;
    Ok(expr.zero_extend(total)?.into())
}

fn reverse(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
    let [arg] = args else {
        return Err(BackendError::arity(Op::Reverse, "1", args.len()));
    };
    Ok(expect_abstract(Op::Reverse, arg)?.reverse()?.into())
}

register_op!(raw Op::LShR => lshr);
register_op!(expr Op::Concat => concat);
register_op!(raw Op::Extract => extract);
register_op!(expr Op::SignExt => sign_ext);
register_op!(expr Op::ZeroExt => zero_ext);
register_op!(raw Op::Reverse => reverse);
