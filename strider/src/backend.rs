use crate::registry::{self, OpImpl};
use crate::{BackendConfig, BackendError, Datum, Expr, Op, Value};
use strider_domain::{BoolResult, StridedInterval};
use tracing::instrument;

/// The value-set analysis backend: converts operands into the abstract domain and applies
/// operators to them.
///
/// A backend carries only its configuration; all operators are pure, so a single instance can
/// be shared freely between threads.
#[derive(Debug, Clone, Default)]
pub struct Backend {
    config: BackendConfig,
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Map an operand into its canonical form. Expression nodes are evaluated.
    pub fn convert(&self, datum: &Datum) -> Result<Value, BackendError> {
        match datum {
            Datum::Int(i) => Ok(Value::Int(*i)),
            Datum::Float(f) => Ok(Value::Float(*f)),
            Datum::Str(s) => Ok(Value::Str(s.clone())),
            Datum::Native(b) => Ok(Value::Bool(BoolResult::from(*b))),
            Datum::BitVec(bv) => Ok(Value::Abstract(StridedInterval::from(*bv).into())),
            Datum::Abstract(v) => Ok(Value::Abstract(v.clone())),
            Datum::Bool(b) => Ok(Value::Bool(*b)),
            Datum::Expr(e) => self.dispatch(e),
            Datum::Foreign(name) => Err(BackendError::UnsupportedType(name.clone())),
        }
    }

    /// Evaluate one expression node
    #[instrument(level = "debug", skip_all, fields(op = %expr.op()))]
    pub fn dispatch(&self, expr: &Expr) -> Result<Value, BackendError> {
        let imp = registry::lookup(expr.op()).ok_or_else(|| {
            BackendError::UnsupportedExprType(format!("no implementation for {}", expr.op()))
        })?;
        match imp {
            OpImpl::Raw(f) => {
                let args = expr
                    .args()
                    .iter()
                    .map(|a| self.convert(a))
                    .collect::<Result<Vec<_>, _>>()?;
                f(self, &args)
            }
            OpImpl::Expr(f) => f(self, expr),
        }
    }

    /// Build a node from `op` and `args` and evaluate it
    pub fn call(
        &self,
        op: Op,
        args: impl IntoIterator<Item = Datum>,
        bits: u32,
    ) -> Result<Value, BackendError> {
        self.dispatch(&Expr::new(op, args, bits))
    }

    /// Bit width of an operand
    pub fn size(&self, datum: &Datum) -> Result<u32, BackendError> {
        match datum {
            Datum::Int(i) => Err(BackendError::UnsupportedArgumentType(format!(
                "cannot take the size of the raw integer {i}"
            ))),
            Datum::Abstract(v) => Ok(v.bits()),
            Datum::BitVec(bv) => Ok(bv.bits()),
            Datum::Expr(e) => Ok(e.size()),
            other => Err(BackendError::UnsupportedExprType(format!(
                "{} has no size",
                other.type_name()
            ))),
        }
    }

    /// The unconstrained interval of a width, optionally named
    pub fn top_interval(&self, bits: u32, name: Option<&str>) -> Result<StridedInterval, BackendError> {
        let top = StridedInterval::top(bits)?;
        Ok(match name {
            Some(name) => top.with_name(name),
            None => top,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strider_domain::BitVec;

    #[test]
    fn conversion() {
        let backend = Backend::new();
        assert_eq!(backend.convert(&Datum::Int(3)), Ok(Value::Int(3)));
        assert_eq!(
            backend.convert(&Datum::Native(false)),
            Ok(Value::Bool(BoolResult::False))
        );
        let bv = BitVec::new(8, 0x2a).unwrap();
        let converted = backend.convert(&bv.into()).unwrap();
        let si = converted.as_abstract().unwrap();
        assert_eq!(si.bits(), 8);
        assert!(si.unique());
        assert_eq!(si.eval(4), vec![0x2a]);
    }

    #[test]
    fn unknown_types_are_rejected() {
        let backend = Backend::new();
        assert!(matches!(
            backend.convert(&Datum::Foreign("z3::ast::BV".to_string())),
            Err(BackendError::UnsupportedType(_))
        ));
    }

    #[test]
    fn nested_nodes_are_evaluated() {
        let backend = Backend::new();
        let inner = Expr::new(Op::Not, [Datum::Native(true)], 1);
        let outer = Expr::new(Op::Not, [inner.into()], 1);
        assert_eq!(backend.dispatch(&outer), Ok(Value::Bool(BoolResult::True)));
    }

    #[test]
    fn sizes() {
        let backend = Backend::new();
        assert!(matches!(
            backend.size(&Datum::Int(4)),
            Err(BackendError::UnsupportedArgumentType(_))
        ));
        let top = backend.top_interval(32, Some("esp")).unwrap();
        assert_eq!(top.name(), Some("esp"));
        assert_eq!(backend.size(&top.into()), Ok(32));
        let node = Expr::new(Op::Concat, [], 24);
        assert_eq!(backend.size(&node.into()), Ok(24));
    }
}
