use crate::normalize::unify_reversed;
use crate::{Backend, BackendError, Datum, Expr, Op, Value, register_op};
use strider_domain::{AbstractValue, DomainError};

type LatticeFn = fn(&AbstractValue, &AbstractValue) -> Result<AbstractValue, DomainError>;

fn operand(op: Op, datum: &Datum) -> Result<&AbstractValue, BackendError> {
    match datum {
        Datum::Abstract(v) => Ok(v),
        other => Err(BackendError::UnsupportedExprType(format!(
            "{op} does not accept {}",
            other.type_name()
        ))),
    }
}

/// Binary lattice operations. Operands of different shapes are lifted to the more expressive
/// of the two shapes (interval, then interval set, then value set) before `f` runs, so the
/// result does not depend on which side held which shape.
fn lattice(backend: &Backend, node: &Expr, f: LatticeFn) -> Result<Value, BackendError> {
    let op = node.op();
    if node.args().len() != 2 {
        return Err(BackendError::arity(op, "2", node.args().len()));
    }
    let result = unify_reversed(backend, node, |node| {
        let [a, b] = node.args() else {
            return Err(BackendError::arity(op, "2", node.args().len()));
        };
        let (a, b) = (operand(op, a)?, operand(op, b)?);
        if a.shape() != b.shape() {
            tracing::trace!(%op, from = %a.shape(), to = %b.shape(), "lifting mixed-shape operands");
        }
        Ok(f(a, b)?)
    })?;
    Ok(result.into())
}

fn union(backend: &Backend, node: &Expr) -> Result<Value, BackendError> {
    lattice(backend, node, AbstractValue::union)
}

fn intersection(backend: &Backend, node: &Expr) -> Result<Value, BackendError> {
    lattice(backend, node, AbstractValue::intersection)
}

/// `widen(old, new)`, the convergence operator of fixpoint iteration
fn widen(backend: &Backend, node: &Expr) -> Result<Value, BackendError> {
    lattice(backend, node, AbstractValue::widen)
}

register_op!(expr Op::Union => union);
register_op!(expr Op::Intersection => intersection);
register_op!(expr Op::Widen => widen);
