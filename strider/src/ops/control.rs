use super::{convert_all, expect_abstract, expect_int, expect_width, truncate};
use crate::normalize::coerce_bool;
use crate::{Backend, BackendError, Expr, Op, Value, register_op};
use strider_domain::{StridedInterval, ValueSet};

/// `If(cond, t, f)`: a decided condition picks its branch, an undecided one joins both
fn ite(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
    let [cond, t, f] = args else {
        return Err(BackendError::arity(Op::If, "3", args.len()));
    };
    let cond = coerce_bool(cond)?;
    if !cond.has_false() || t == f {
        return Ok(t.clone());
    }
    if !cond.has_true() {
        return Ok(f.clone());
    }
    match (t, f) {
        (Value::Abstract(t), Value::Abstract(f)) => Ok(t.union(f)?.into()),
        (Value::Bool(t), Value::Bool(f)) => Ok(t.join(*f).into()),
        (t, f) => Err(BackendError::UnsupportedExprType(format!(
            "cannot join branches of type {} and {}",
            t.type_name(),
            f.type_name()
        ))),
    }
}

/// A symbolic variable summarized by its declared range: `BVS(name)` is unconstrained,
/// `BVS(name, min, max, stride)` is bounded. The width is the node's size.
fn bvs(backend: &Backend, node: &Expr) -> Result<Value, BackendError> {
    let bits = node.size();
    let args = convert_all(backend, node, node.args())?;
    let (name, bounds) = match args.as_slice() {
        [Value::Str(name)] => (name, None),
        [Value::Str(name), min, max, stride] => (name, Some((min, max, stride))),
        [other, ..] if !matches!(other, Value::Str(_)) => {
            return Err(BackendError::UnsupportedArgumentType(format!(
                "BVS expects a name, got {}",
                other.type_name()
            )));
        }
        _ => return Err(BackendError::arity(Op::BVS, "1 or 4", args.len())),
    };
    let si = match bounds {
        None => backend.top_interval(bits, Some(name.as_str()))?,
        Some((min, max, stride)) => {
            let bound = |v: &Value| expect_int(Op::BVS, v).map(|i| truncate(i, bits));
            StridedInterval::named(name, bits, bound(min)?, bound(max)?, bound(stride)?)?
        }
    };
    Ok(Value::Abstract(si.into()))
}

/// `StridedInterval(bits, stride, lower, upper)`
fn strided_interval(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
    let [bits, stride, lower, upper] = args else {
        return Err(BackendError::arity(Op::StridedInterval, "4", args.len()));
    };
    let bits = expect_width(Op::StridedInterval, bits)?;
    let field = |v: &Value| expect_int(Op::StridedInterval, v).map(|i| truncate(i, bits));
    let si = StridedInterval::new(bits, field(stride)?, field(lower)?, field(upper)?)?;
    Ok(Value::Abstract(si.into()))
}

/// `ValueSet(region, offsets)`
fn value_set(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
    let [region, offsets] = args else {
        return Err(BackendError::arity(Op::ValueSet, "2", args.len()));
    };
    let Value::Str(region) = region else {
        return Err(BackendError::UnsupportedArgumentType(format!(
            "ValueSet expects a region name, got {}",
            region.type_name()
        )));
    };
    let offsets = expect_abstract(Op::ValueSet, offsets)?;
    let hull = offsets.hull().ok_or_else(|| {
        BackendError::UnsupportedExprType(format!("{} cannot be used as offsets", offsets.shape()))
    })?;
    let vs = ValueSet::new(offsets.bits())?.with_region(region, hull)?;
    Ok(Value::Abstract(vs.into()))
}

register_op!(raw Op::If => ite);
register_op!(expr Op::BVS => bvs);
register_op!(raw Op::StridedInterval => strided_interval);
register_op!(raw Op::ValueSet => value_set);
