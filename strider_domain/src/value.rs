use crate::{
    BoolResult, Comparison, DiscreteIntervalSet, DomainError, StridedInterval, ValueSet,
};
use serde::{Deserialize, Serialize};

/// The three abstract value shapes, ordered by lifting precedence: in a mixed-shape set
/// operation the lower-ranked operand is lifted into the shape of the higher-ranked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Shape {
    Interval,
    Set,
    ValueSet,
}

/// An over-approximation of the concrete values a bit-vector can take
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbstractValue {
    Interval(StridedInterval),
    Set(DiscreteIntervalSet),
    ValueSet(ValueSet),
}

/// Two operands lifted to a common shape, argument order preserved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pair {
    Intervals(StridedInterval, StridedInterval),
    Sets(DiscreteIntervalSet, DiscreteIntervalSet),
    ValueSets(ValueSet, ValueSet),
}

impl AbstractValue {
    pub fn shape(&self) -> Shape {
        match self {
            AbstractValue::Interval(_) => Shape::Interval,
            AbstractValue::Set(_) => Shape::Set,
            AbstractValue::ValueSet(_) => Shape::ValueSet,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            AbstractValue::Interval(si) => si.bits(),
            AbstractValue::Set(set) => set.bits(),
            AbstractValue::ValueSet(vs) => vs.bits(),
        }
    }

    pub fn is_reversed(&self) -> bool {
        match self {
            AbstractValue::Interval(si) => si.is_reversed(),
            AbstractValue::Set(set) => set.is_reversed(),
            AbstractValue::ValueSet(vs) => vs.is_reversed(),
        }
    }

    /// The stored value of a lazily reversed value, i.e. the value before its pending reversal
    pub fn reversed_raw(&self) -> Self {
        match self {
            AbstractValue::Interval(si) => si.reversed_raw().into(),
            AbstractValue::Set(set) => set.reversed_raw().into(),
            AbstractValue::ValueSet(vs) => vs.reversed_raw().into(),
        }
    }

    pub fn reverse(&self) -> Result<Self, DomainError> {
        Ok(match self {
            AbstractValue::Interval(si) => si.reverse()?.into(),
            AbstractValue::Set(set) => set.reverse()?.into(),
            AbstractValue::ValueSet(vs) => vs.reverse()?.into(),
        })
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AbstractValue::Interval(si) => si.is_empty(),
            AbstractValue::Set(set) => set.is_empty(),
            AbstractValue::ValueSet(vs) => vs.is_empty(),
        }
    }

    /// Lift into a shape of equal or higher precedence
    pub fn lift(&self, shape: Shape) -> Option<Self> {
        match (self, shape) {
            (v, s) if v.shape() == s => Some(v.clone()),
            (AbstractValue::Interval(si), Shape::Set) => {
                Some(DiscreteIntervalSet::from(si.clone()).into())
            }
            (AbstractValue::Interval(si), Shape::ValueSet) => {
                Some(ValueSet::from_interval(si.clone()).into())
            }
            (AbstractValue::Set(set), Shape::ValueSet) => {
                Some(ValueSet::from_interval(set.collapse()).into())
            }
            _ => None,
        }
    }

    /// Bring both operands to the higher-precedence shape of the two
    pub fn lift_pair(&self, other: &Self) -> Result<Pair, DomainError> {
        if self.bits() != other.bits() {
            return Err(DomainError::WidthMismatch(self.bits(), other.bits()));
        }
        let shape = self.shape().max(other.shape());
        match (self.lift(shape), other.lift(shape)) {
            (Some(AbstractValue::Interval(a)), Some(AbstractValue::Interval(b))) => {
                Ok(Pair::Intervals(a, b))
            }
            (Some(AbstractValue::Set(a)), Some(AbstractValue::Set(b))) => Ok(Pair::Sets(a, b)),
            (Some(AbstractValue::ValueSet(a)), Some(AbstractValue::ValueSet(b))) => {
                Ok(Pair::ValueSets(a, b))
            }
            _ => Err(DomainError::UnsupportedShape {
                op: "lift",
                shape,
            }),
        }
    }

    /// The single interval covering every member, when the value has no region structure.
    /// Its stored bounds are actual bounds: a pending reversal widens it to the whole width.
    pub fn hull(&self) -> Option<StridedInterval> {
        match self {
            AbstractValue::Interval(si) => Some(si.effective().into_owned()),
            AbstractValue::Set(set) => Some(set.collapse()),
            AbstractValue::ValueSet(vs) => match vs.effective().single_region() {
                Some((region, offsets)) if region.is_global() => Some(offsets.clone()),
                _ => None,
            },
        }
    }

    pub fn compare(&self, cmp: Comparison, other: &Self) -> Result<BoolResult, DomainError> {
        if self.bits() != other.bits() {
            return Err(DomainError::WidthMismatch(self.bits(), other.bits()));
        }
        match self {
            AbstractValue::Interval(si) => match other.hull() {
                Some(hull) => si.compare(cmp, &hull),
                None => Ok(BoolResult::Maybe),
            },
            AbstractValue::Set(set) => match other.hull() {
                Some(hull) => set.compare(cmp, &hull),
                None => Ok(BoolResult::Maybe),
            },
            AbstractValue::ValueSet(vs) => {
                let vs = vs.effective();
                let Some((region, offsets)) = vs.single_region() else {
                    return Ok(BoolResult::Maybe);
                };
                match other {
                    AbstractValue::ValueSet(o) => match o.effective().single_region() {
                        Some((r, o)) if r == region => offsets.compare(cmp, o),
                        _ => Ok(BoolResult::Maybe),
                    },
                    _ if region.is_global() => match other.hull() {
                        Some(hull) => offsets.compare(cmp, &hull),
                        None => Ok(BoolResult::Maybe),
                    },
                    _ => Ok(BoolResult::Maybe),
                }
            }
        }
    }

    pub fn extract(&self, high: u32, low: u32) -> Result<Self, DomainError> {
        Ok(match self {
            AbstractValue::Interval(si) => si.extract(high, low)?.into(),
            AbstractValue::Set(set) => set.extract(high, low)?.into(),
            AbstractValue::ValueSet(vs) => vs.extract(high, low)?.into(),
        })
    }

    /// `self` as the high part, `low` as the low part
    pub fn concat(&self, low: &Self) -> Result<Self, DomainError> {
        match (self, low) {
            (AbstractValue::Interval(a), AbstractValue::Interval(b)) => Ok(a.concat(b)?.into()),
            (AbstractValue::ValueSet(_), _) | (_, AbstractValue::ValueSet(_)) => {
                Err(DomainError::UnsupportedShape {
                    op: "concat",
                    shape: Shape::ValueSet,
                })
            }
            (a, b) => match (a.lift(Shape::Set), b.lift(Shape::Set)) {
                (Some(AbstractValue::Set(a)), Some(AbstractValue::Set(b))) => Ok(a.concat(&b)?.into()),
                _ => Err(DomainError::UnsupportedShape {
                    op: "concat",
                    shape: Shape::Set,
                }),
            },
        }
    }

    pub fn zero_extend(&self, total: u32) -> Result<Self, DomainError> {
        match self {
            AbstractValue::Interval(si) => Ok(si.zero_extend(total)?.into()),
            AbstractValue::Set(set) => Ok(set.zero_extend(total)?.into()),
            AbstractValue::ValueSet(_) => Err(DomainError::UnsupportedShape {
                op: "zero_extend",
                shape: Shape::ValueSet,
            }),
        }
    }

    pub fn sign_extend(&self, total: u32) -> Result<Self, DomainError> {
        match self {
            AbstractValue::Interval(si) => Ok(si.sign_extend(total)?.into()),
            AbstractValue::Set(set) => Ok(set.sign_extend(total)?.into()),
            AbstractValue::ValueSet(_) => Err(DomainError::UnsupportedShape {
                op: "sign_extend",
                shape: Shape::ValueSet,
            }),
        }
    }

    /// Logical right shift by an amount that must have no region structure
    pub fn lshr(&self, amount: &Self) -> Result<Self, DomainError> {
        let Some(amount) = amount.hull() else {
            return Err(DomainError::UnsupportedShape {
                op: "lshr amount",
                shape: amount.shape(),
            });
        };
        Ok(match self {
            AbstractValue::Interval(si) => si.lshr(&amount)?.into(),
            AbstractValue::Set(set) => set.lshr(&amount)?.into(),
            AbstractValue::ValueSet(vs) => vs.lshr(&amount)?.into(),
        })
    }

    pub fn union(&self, other: &Self) -> Result<Self, DomainError> {
        Ok(match self.lift_pair(other)? {
            Pair::Intervals(a, b) => a.union(&b)?.into(),
            Pair::Sets(a, b) => a.union(&b)?.into(),
            Pair::ValueSets(a, b) => a.union(&b)?.into(),
        })
    }

    pub fn intersection(&self, other: &Self) -> Result<Self, DomainError> {
        Ok(match self.lift_pair(other)? {
            Pair::Intervals(a, b) => a.intersection(&b)?.into(),
            Pair::Sets(a, b) => a.intersection(&b)?.into(),
            Pair::ValueSets(a, b) => a.intersection(&b)?.into(),
        })
    }

    /// `self` is the previous iterate, `new` the current one
    pub fn widen(&self, new: &Self) -> Result<Self, DomainError> {
        Ok(match self.lift_pair(new)? {
            Pair::Intervals(a, b) => a.widen(&b)?.into(),
            Pair::Sets(a, b) => a.widen(&b)?.into(),
            Pair::ValueSets(a, b) => a.widen(&b)?.into(),
        })
    }

    /// Whether any member of `self` also lies in `candidate`
    pub fn intersects(&self, candidate: &StridedInterval) -> Result<bool, DomainError> {
        if self.bits() != candidate.bits() {
            return Err(DomainError::WidthMismatch(self.bits(), candidate.bits()));
        }
        Ok(match self {
            AbstractValue::Interval(si) => !si.overlap(candidate).is_empty(),
            AbstractValue::Set(set) => set.members().iter().any(|m| !m.overlap(candidate).is_empty()),
            AbstractValue::ValueSet(vs) => vs.intersects(candidate),
        })
    }

    pub fn eval(&self, n: usize) -> Vec<u128> {
        match self {
            AbstractValue::Interval(si) => si.eval(n),
            AbstractValue::Set(set) => set.eval(n),
            AbstractValue::ValueSet(vs) => vs.eval(n),
        }
    }

    pub fn unique(&self) -> bool {
        match self {
            AbstractValue::Interval(si) => si.unique(),
            AbstractValue::Set(set) => set.unique(),
            AbstractValue::ValueSet(vs) => vs.unique(),
        }
    }

    /// Structural identity; values of different shapes are never identical
    pub fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (AbstractValue::Interval(a), AbstractValue::Interval(b)) => a.identical(b),
            (AbstractValue::Set(a), AbstractValue::Set(b)) => a.identical(b),
            (AbstractValue::ValueSet(a), AbstractValue::ValueSet(b)) => a.identical(b),
            _ => false,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            AbstractValue::Interval(si) => si.name(),
            _ => None,
        }
    }
}

impl From<StridedInterval> for AbstractValue {
    fn from(value: StridedInterval) -> Self {
        AbstractValue::Interval(value)
    }
}

impl From<DiscreteIntervalSet> for AbstractValue {
    fn from(value: DiscreteIntervalSet) -> Self {
        AbstractValue::Set(value)
    }
}

impl From<ValueSet> for AbstractValue {
    fn from(value: ValueSet) -> Self {
        AbstractValue::ValueSet(value)
    }
}
