use super::abstract_at;
use crate::normalize::order_commutative;
use crate::{Backend, BackendError, Op, Value, register_op};
use strider_domain::Comparison;

/// The abstract operand always receives the comparison. When the operands had to be swapped
/// the comparison is mirrored so `a < b` is still asked as `b > a`.
fn compare(cmp: Comparison, args: &[Value]) -> Result<Value, BackendError> {
    let ordered = order_commutative(args)?;
    let cmp = if ordered.swapped { cmp.mirrored() } else { cmp };
    let other = abstract_at(Op::from(cmp), ordered.other, ordered.receiver.bits())?;
    Ok(ordered.receiver.compare(cmp, &other)?.into())
}

macro_rules! comparison_ops {
    ($($cmp:ident => $name:ident),* $(,)?) => {
        $(
            fn $name(_: &Backend, args: &[Value]) -> Result<Value, BackendError> {
                compare(Comparison::$cmp, args)
            }

            register_op!(raw Op::$cmp => $name);
        )*
    };
}

comparison_ops!(
    ULT => ult,
    ULE => ule,
    UGT => ugt,
    UGE => uge,
    SLT => slt,
    SLE => sle,
    SGT => sgt,
    SGE => sge,
);
