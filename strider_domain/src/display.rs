use crate::{
    AbstractValue, BitVec, BoolResult, DiscreteIntervalSet, Region, Shape, StridedInterval,
    ValueSet,
};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Shape::Interval => write!(f, "strided interval"),
            Shape::Set => write!(f, "discrete interval set"),
            Shape::ValueSet => write!(f, "value set"),
        }
    }
}

impl Display for BoolResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoolResult::True => write!(f, "true"),
            BoolResult::False => write!(f, "false"),
            BoolResult::Maybe => write!(f, "maybe"),
        }
    }
}

impl Display for BitVec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}:{}", self.value(), self.bits())
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `<bits>[lo, hi]/stride`, with `~` for a pending byte reversal
impl Display for StridedInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.name() {
            write!(f, "{name}=")?;
        }
        if self.is_reversed() {
            write!(f, "~")?;
        }
        if self.is_empty() {
            return write!(f, "<{}>[]", self.bits());
        }
        if self.unique() {
            return write!(f, "<{}>{:#x}", self.bits(), self.lower_bound());
        }
        write!(
            f,
            "<{}>[{:#x}, {:#x}]/{:#x}",
            self.bits(),
            self.lower_bound(),
            self.upper_bound(),
            self.stride()
        )
    }
}

impl Display for DiscreteIntervalSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.members().iter().join(", "))
    }
}

impl Display for ValueSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_reversed() {
            write!(f, "~")?;
        }
        write!(
            f,
            "({})",
            self.items()
                .map(|(region, offsets)| format!("{region}: {offsets}"))
                .join(", ")
        )
    }
}

impl Display for AbstractValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AbstractValue::Interval(si) => si.fmt(f),
            AbstractValue::Set(set) => set.fmt(f),
            AbstractValue::ValueSet(vs) => vs.fmt(f),
        }
    }
}
