use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, Not};

/// A three-valued truth value produced by abstract comparisons.
///
/// `Maybe` means the abstract operands admit both a satisfying and a falsifying concretization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolResult {
    True,
    False,
    Maybe,
}

impl BoolResult {
    pub fn has_true(&self) -> bool {
        !matches!(self, BoolResult::False)
    }

    pub fn has_false(&self) -> bool {
        !matches!(self, BoolResult::True)
    }

    pub fn is_true(&self) -> bool {
        matches!(self, BoolResult::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, BoolResult::False)
    }

    /// The concrete truth values this result admits
    pub fn values(&self) -> &'static [bool] {
        match self {
            BoolResult::True => &[true],
            BoolResult::False => &[false],
            BoolResult::Maybe => &[true, false],
        }
    }

    /// Least upper bound: equal results are kept, anything else becomes `Maybe`
    pub fn join(self, other: BoolResult) -> BoolResult {
        if self == other {
            self
        } else {
            BoolResult::Maybe
        }
    }
}

impl From<bool> for BoolResult {
    fn from(value: bool) -> Self {
        if value {
            BoolResult::True
        } else {
            BoolResult::False
        }
    }
}

impl BitAnd for BoolResult {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (BoolResult::False, _) | (_, BoolResult::False) => BoolResult::False,
            (BoolResult::True, BoolResult::True) => BoolResult::True,
            _ => BoolResult::Maybe,
        }
    }
}

impl Not for BoolResult {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            BoolResult::True => BoolResult::False,
            BoolResult::False => BoolResult::True,
            BoolResult::Maybe => BoolResult::Maybe,
        }
    }
}
