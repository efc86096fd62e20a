//! Expression nodes handed to the backend and the operand values they carry.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use strider_domain::{AbstractValue, BitVec, BoolResult, Comparison, StridedInterval};

/// Operator tags understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    And,
    Not,
    ULT,
    ULE,
    UGT,
    UGE,
    SLT,
    SLE,
    SGT,
    SGE,
    If,
    BVS,
    LShR,
    Concat,
    Extract,
    SignExt,
    ZeroExt,
    Reverse,
    Union,
    Intersection,
    Widen,
    /// Build an interval from `(bits, stride, lower, upper)`
    StridedInterval,
    /// Place an interval of offsets into a named region: `(region, offsets)`
    ValueSet,
}

impl Op {
    pub fn comparison(self) -> Option<Comparison> {
        match self {
            Op::ULT => Some(Comparison::ULT),
            Op::ULE => Some(Comparison::ULE),
            Op::UGT => Some(Comparison::UGT),
            Op::UGE => Some(Comparison::UGE),
            Op::SLT => Some(Comparison::SLT),
            Op::SLE => Some(Comparison::SLE),
            Op::SGT => Some(Comparison::SGT),
            Op::SGE => Some(Comparison::SGE),
            _ => None,
        }
    }
}

impl From<Comparison> for Op {
    fn from(value: Comparison) -> Self {
        match value {
            Comparison::ULT => Op::ULT,
            Comparison::ULE => Op::ULE,
            Comparison::UGT => Op::UGT,
            Comparison::UGE => Op::UGE,
            Comparison::SLT => Op::SLT,
            Comparison::SLE => Op::SLE,
            Comparison::SGT => Op::SGT,
            Comparison::SGE => Op::SGE,
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Op::Union => write!(f, "union"),
            Op::Intersection => write!(f, "intersection"),
            Op::Widen => write!(f, "widen"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// An operand as it reaches the backend, before conversion
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Int(i128),
    Float(f64),
    Str(String),
    Native(bool),
    BitVec(BitVec),
    Abstract(AbstractValue),
    Bool(BoolResult),
    Expr(Arc<Expr>),
    /// A value owned by some other backend, known only by its type name
    Foreign(String),
}

impl Datum {
    pub fn type_name(&self) -> &str {
        match self {
            Datum::Int(_) => "int",
            Datum::Float(_) => "float",
            Datum::Str(_) => "str",
            Datum::Native(_) => "bool",
            Datum::BitVec(_) => "BitVec",
            Datum::Abstract(v) => shape_name(v),
            Datum::Bool(_) => "BoolResult",
            Datum::Expr(_) => "Expr",
            Datum::Foreign(name) => name.as_str(),
        }
    }
}

impl From<i128> for Datum {
    fn from(value: i128) -> Self {
        Datum::Int(value)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Native(value)
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Str(value.to_string())
    }
}

impl From<BitVec> for Datum {
    fn from(value: BitVec) -> Self {
        Datum::BitVec(value)
    }
}

impl From<BoolResult> for Datum {
    fn from(value: BoolResult) -> Self {
        Datum::Bool(value)
    }
}

impl From<AbstractValue> for Datum {
    fn from(value: AbstractValue) -> Self {
        Datum::Abstract(value)
    }
}

impl From<StridedInterval> for Datum {
    fn from(value: StridedInterval) -> Self {
        Datum::Abstract(value.into())
    }
}

impl From<Expr> for Datum {
    fn from(value: Expr) -> Self {
        Datum::Expr(Arc::new(value))
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        match value {
            Value::Int(i) => Datum::Int(i),
            Value::Float(f) => Datum::Float(f),
            Value::Str(s) => Datum::Str(s),
            Value::Abstract(v) => Datum::Abstract(v),
            Value::Bool(b) => Datum::Bool(b),
        }
    }
}

/// A converted operand: raw literals pass through, everything else is in domain form
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i128),
    Float(f64),
    Str(String),
    Abstract(AbstractValue),
    Bool(BoolResult),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Abstract(v) => shape_name(v),
            Value::Bool(_) => "BoolResult",
        }
    }

    pub fn as_abstract(&self) -> Option<&AbstractValue> {
        match self {
            Value::Abstract(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<BoolResult> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn into_abstract(self) -> Option<AbstractValue> {
        match self {
            Value::Abstract(v) => Some(v),
            _ => None,
        }
    }
}

impl From<AbstractValue> for Value {
    fn from(value: AbstractValue) -> Self {
        Value::Abstract(value)
    }
}

impl From<BoolResult> for Value {
    fn from(value: BoolResult) -> Self {
        Value::Bool(value)
    }
}

fn shape_name(value: &AbstractValue) -> &'static str {
    match value {
        AbstractValue::Interval(_) => "StridedInterval",
        AbstractValue::Set(_) => "DiscreteIntervalSet",
        AbstractValue::ValueSet(_) => "ValueSet",
    }
}

/// An immutable operator application with a declared result width
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    op: Op,
    args: Vec<Datum>,
    bits: u32,
}

impl Expr {
    pub fn new(op: Op, args: impl IntoIterator<Item = Datum>, bits: u32) -> Self {
        Self {
            op,
            args: args.into_iter().collect(),
            bits,
        }
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn args(&self) -> &[Datum] {
        &self.args
    }

    /// Declared width of the node's result
    pub fn size(&self) -> u32 {
        self.bits
    }

    /// The same operator and size over a replacement operand list
    pub fn swap_args(&self, args: Vec<Datum>) -> Self {
        Self {
            op: self.op,
            args,
            bits: self.bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_ops_round_trip() {
        for cmp in Comparison::ALL {
            assert_eq!(Op::from(cmp).comparison(), Some(cmp));
        }
        assert_eq!(Op::Union.comparison(), None);
        assert_eq!(Op::Union.to_string(), "union");
        assert_eq!(Op::LShR.to_string(), "LShR");
    }

    #[test]
    fn swapping_keeps_op_and_size() {
        let e = Expr::new(Op::Union, [Datum::Int(1), Datum::Int(2)], 8);
        let swapped = e.swap_args(vec![Datum::Int(3)]);
        assert_eq!(swapped.op(), Op::Union);
        assert_eq!(swapped.size(), 8);
        assert_eq!(swapped.args(), &[Datum::Int(3)]);
        assert_eq!(e.args().len(), 2);
    }
}
