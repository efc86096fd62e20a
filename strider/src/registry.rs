//! The process-wide operator table.
//!
//! Operator implementations submit themselves with [`register_op!`]; the table is assembled from
//! those submissions the first time it is consulted and never changes afterwards.

use crate::{Backend, BackendError, Expr, Op, Value};
use std::{collections::HashMap, sync::OnceLock};

/// Receives the already-converted operands
pub type RawOpFn = fn(&Backend, &[Value]) -> Result<Value, BackendError>;
/// Receives the expression node itself and converts operands on its own terms
pub type ExprOpFn = fn(&Backend, &Expr) -> Result<Value, BackendError>;

#[derive(Clone, Copy)]
pub enum OpImpl {
    Raw(RawOpFn),
    Expr(ExprOpFn),
}

impl std::fmt::Debug for OpImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpImpl::Raw(_) => write!(f, "OpImpl::Raw"),
            OpImpl::Expr(_) => write!(f, "OpImpl::Expr"),
        }
    }
}

/// A factory wrapper submitted to `inventory`, one per operator
pub struct OpRegistration(pub fn() -> (Op, OpImpl));

inventory::collect!(OpRegistration);

#[macro_export]
macro_rules! register_op {
    (raw $op:expr => $func:path) => {
        $crate::register_op!(@submit $op, $crate::registry::OpImpl::Raw($func));
    };
    (expr $op:expr => $func:path) => {
        $crate::register_op!(@submit $op, $crate::registry::OpImpl::Expr($func));
    };
    (@submit $op:expr, $imp:expr) => {
        const _: () = {
            fn factory() -> ($crate::Op, $crate::registry::OpImpl) {
                ($op, $imp)
            }

            inventory::submit! {
                $crate::registry::OpRegistration(factory)
            }
        };
    };
}

static OP_REGISTRY: OnceLock<HashMap<Op, OpImpl>> = OnceLock::new();

fn build_op_registry() -> HashMap<Op, OpImpl> {
    let mut m = HashMap::new();
    for registration in inventory::iter::<OpRegistration> {
        let (op, imp) = (registration.0)();
        if m.insert(op, imp).is_some() {
            tracing::warn!(%op, "operator registered twice, keeping the last registration");
        }
    }
    tracing::debug!(count = m.len(), "built operator registry");
    m
}

pub fn lookup(op: Op) -> Option<OpImpl> {
    OP_REGISTRY.get_or_init(build_op_registry).get(&op).copied()
}
