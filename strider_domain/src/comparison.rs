use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The ordered bit-vector comparisons every abstract value supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    ULT,
    ULE,
    UGT,
    UGE,
    SLT,
    SLE,
    SGT,
    SGE,
}

impl Comparison {
    pub const ALL: [Comparison; 8] = [
        Comparison::ULT,
        Comparison::ULE,
        Comparison::UGT,
        Comparison::UGE,
        Comparison::SLT,
        Comparison::SLE,
        Comparison::SGT,
        Comparison::SGE,
    ];

    /// The comparison that holds for `(b, a)` whenever `self` holds for `(a, b)`
    pub fn mirrored(self) -> Self {
        match self {
            Comparison::ULT => Comparison::UGT,
            Comparison::ULE => Comparison::UGE,
            Comparison::UGT => Comparison::ULT,
            Comparison::UGE => Comparison::ULE,
            Comparison::SLT => Comparison::SGT,
            Comparison::SLE => Comparison::SGE,
            Comparison::SGT => Comparison::SLT,
            Comparison::SGE => Comparison::SLE,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Comparison::SLT | Comparison::SLE | Comparison::SGT | Comparison::SGE
        )
    }

    /// Decide the comparison for two ordered ranges `[a_lo, a_hi]` and `[b_lo, b_hi]`
    pub(crate) fn decide<T: Ord>(self, a: (T, T), b: (T, T)) -> crate::BoolResult {
        use crate::BoolResult::*;
        let (a_lo, a_hi) = a;
        let (b_lo, b_hi) = b;
        match self {
            Comparison::ULT | Comparison::SLT => {
                if a_hi < b_lo {
                    True
                } else if a_lo >= b_hi {
                    False
                } else {
                    Maybe
                }
            }
            Comparison::ULE | Comparison::SLE => {
                if a_hi <= b_lo {
                    True
                } else if a_lo > b_hi {
                    False
                } else {
                    Maybe
                }
            }
            Comparison::UGT | Comparison::SGT => {
                if a_lo > b_hi {
                    True
                } else if a_hi <= b_lo {
                    False
                } else {
                    Maybe
                }
            }
            Comparison::UGE | Comparison::SGE => {
                if a_lo >= b_hi {
                    True
                } else if a_hi < b_lo {
                    False
                } else {
                    Maybe
                }
            }
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Comparison {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Comparison::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown comparison `{s}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoolResult;

    #[test]
    fn mirror_is_involution() {
        for c in Comparison::ALL {
            assert_eq!(c.mirrored().mirrored(), c);
            assert_eq!(c.mirrored().is_signed(), c.is_signed());
        }
    }

    #[test]
    fn decide_ranges() {
        assert_eq!(Comparison::ULT.decide((3, 3), (5, 5)), BoolResult::True);
        assert_eq!(Comparison::ULT.decide((5, 5), (3, 3)), BoolResult::False);
        assert_eq!(Comparison::ULT.decide((0, 10), (5, 15)), BoolResult::Maybe);
        assert_eq!(Comparison::ULE.decide((5, 5), (5, 5)), BoolResult::True);
        assert_eq!(Comparison::UGE.decide((0, 4), (5, 9)), BoolResult::False);
    }

    #[test]
    fn parse() {
        assert_eq!("sle".parse::<Comparison>(), Ok(Comparison::SLE));
        assert!("lt".parse::<Comparison>().is_err());
    }
}
