use crate::bits::check_width;
use crate::{BoolResult, Comparison, DomainError, StridedInterval};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Past this many members a set is collapsed into the hull of its members
pub const MAX_MEMBERS: usize = 16;

/// A finite union of same-width strided intervals, kept sorted by lower bound.
///
/// Used where a single interval would lose too much precision, e.g. after joining two
/// far-apart ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteIntervalSet {
    bits: u32,
    members: Vec<StridedInterval>,
}

impl DiscreteIntervalSet {
    pub fn new(
        bits: u32,
        members: impl IntoIterator<Item = StridedInterval>,
    ) -> Result<Self, DomainError> {
        check_width(bits)?;
        let members = members.into_iter().collect::<Vec<_>>();
        if let Some(m) = members.iter().find(|m| m.bits() != bits) {
            return Err(DomainError::WidthMismatch(bits, m.bits()));
        }
        Ok(Self::from_members(bits, members))
    }

    fn from_members(bits: u32, members: impl IntoIterator<Item = StridedInterval>) -> Self {
        let members = members
            .into_iter()
            .filter(|m| !m.is_empty())
            .sorted_by_key(|m| (m.lower_bound(), m.upper_bound(), m.stride(), m.is_reversed()))
            .dedup()
            .collect::<Vec<_>>();
        if members.len() > MAX_MEMBERS {
            tracing::trace!(count = members.len(), "collapsing interval set");
            let hull = Self::hull_of(bits, &members);
            return Self {
                bits,
                members: vec![hull],
            };
        }
        Self { bits, members }
    }

    fn hull_of(bits: u32, members: &[StridedInterval]) -> StridedInterval {
        members
            .iter()
            .fold(StridedInterval::bottom(bits), |acc, m| acc.hull(m))
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn members(&self) -> &[StridedInterval] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The single interval covering every member
    pub fn collapse(&self) -> StridedInterval {
        Self::hull_of(self.bits, &self.members)
    }

    pub fn is_reversed(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(StridedInterval::is_reversed)
    }

    pub fn reversed_raw(&self) -> Self {
        Self::from_members(self.bits, self.members.iter().map(StridedInterval::reversed_raw))
    }

    fn check_same_width(&self, bits: u32) -> Result<(), DomainError> {
        if self.bits == bits {
            Ok(())
        } else {
            Err(DomainError::WidthMismatch(self.bits, bits))
        }
    }

    pub fn union(&self, other: &Self) -> Result<Self, DomainError> {
        self.check_same_width(other.bits)?;
        Ok(Self::from_members(
            self.bits,
            self.members.iter().chain(&other.members).cloned(),
        ))
    }

    pub fn intersection(&self, other: &Self) -> Result<Self, DomainError> {
        self.check_same_width(other.bits)?;
        Ok(Self::from_members(
            self.bits,
            self.members
                .iter()
                .cartesian_product(&other.members)
                .map(|(a, b)| a.overlap(b)),
        ))
    }

    /// Widening gives up the member structure: both sides are collapsed first
    pub fn widen(&self, new: &Self) -> Result<StridedInterval, DomainError> {
        self.check_same_width(new.bits)?;
        self.collapse().widen(&new.collapse())
    }

    pub fn compare(&self, cmp: Comparison, other: &StridedInterval) -> Result<BoolResult, DomainError> {
        self.check_same_width(other.bits())?;
        self.members
            .iter()
            .map(|m| m.compare(cmp, other))
            .fold_ok(None, |acc: Option<BoolResult>, r| {
                Some(acc.map_or(r, |a| a.join(r)))
            })
            .map(|r| r.unwrap_or(BoolResult::Maybe))
    }

    fn map_members(
        &self,
        bits: u32,
        f: impl Fn(&StridedInterval) -> Result<StridedInterval, DomainError>,
    ) -> Result<Self, DomainError> {
        let members = self.members.iter().map(f).collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_members(bits, members))
    }

    pub fn extract(&self, high: u32, low: u32) -> Result<Self, DomainError> {
        if low > high || high >= self.bits {
            return Err(DomainError::InvalidBitRange {
                high,
                low,
                bits: self.bits,
            });
        }
        self.map_members(high - low + 1, |m| m.extract(high, low))
    }

    /// `self` as the high part, `low` as the low part, member by member
    pub fn concat(&self, low: &Self) -> Result<Self, DomainError> {
        let total = self.bits + low.bits;
        check_width(total)?;
        let members = self
            .members
            .iter()
            .cartesian_product(&low.members)
            .map(|(a, b)| a.concat(b))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_members(total, members))
    }

    pub fn zero_extend(&self, total: u32) -> Result<Self, DomainError> {
        check_width(total)?;
        self.map_members(total, |m| m.zero_extend(total))
    }

    pub fn sign_extend(&self, total: u32) -> Result<Self, DomainError> {
        check_width(total)?;
        self.map_members(total, |m| m.sign_extend(total))
    }

    pub fn lshr(&self, amount: &StridedInterval) -> Result<Self, DomainError> {
        self.map_members(self.bits, |m| m.lshr(amount))
    }

    pub fn reverse(&self) -> Result<Self, DomainError> {
        self.map_members(self.bits, StridedInterval::reverse)
    }

    pub fn eval(&self, n: usize) -> Vec<u128> {
        self.members
            .iter()
            .flat_map(|m| m.eval(n))
            .take(n)
            .collect()
    }

    pub fn unique(&self) -> bool {
        matches!(self.members.as_slice(), [only] if only.unique())
    }

    pub fn contains(&self, value: u128) -> bool {
        self.members.iter().any(|m| m.contains(value))
    }

    pub fn identical(&self, other: &Self) -> bool {
        self.bits == other.bits
            && self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.identical(b))
    }
}

impl From<StridedInterval> for DiscreteIntervalSet {
    fn from(value: StridedInterval) -> Self {
        Self::from_members(value.bits(), [value])
    }
}
