use crate::bits::{check_width, swap_bytes};
use crate::{DomainError, StridedInterval};
use internment::Intern;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Region that plain numbers (as opposed to pointers) live in
pub const GLOBAL_REGION: &str = "global";

/// Identifier of a memory region a value-set offset is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(Intern<String>);

impl Region {
    pub fn new(name: &str) -> Self {
        Self(Intern::new(name.to_string()))
    }

    pub fn global() -> Self {
        Self::new(GLOBAL_REGION)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_global(&self) -> bool {
        self.as_str() == GLOBAL_REGION
    }
}

impl PartialOrd for Region {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Region {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

type RegionMap = BTreeMap<Region, StridedInterval>;

/// Per-region offset ranges of a pointer-like value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueSet {
    bits: u32,
    regions: RegionMap,
    reversed: bool,
}

impl ValueSet {
    /// A value set with no regions
    pub fn new(bits: u32) -> Result<Self, DomainError> {
        check_width(bits)?;
        Ok(Self {
            bits,
            regions: BTreeMap::new(),
            reversed: false,
        })
    }

    /// Plain numbers: the interval placed in the global region
    pub fn from_interval(offsets: StridedInterval) -> Self {
        let bits = offsets.bits();
        let mut regions = BTreeMap::new();
        if !offsets.is_empty() {
            regions.insert(Region::global(), offsets);
        }
        Self {
            bits,
            regions,
            reversed: false,
        }
    }

    /// Add `offsets` to `region`, joining with whatever the region already holds
    pub fn with_region(mut self, region: &str, offsets: StridedInterval) -> Result<Self, DomainError> {
        if offsets.bits() != self.bits {
            return Err(DomainError::WidthMismatch(self.bits, offsets.bits()));
        }
        if offsets.is_empty() {
            return Ok(self);
        }
        let region = Region::new(region);
        let joined = match self.regions.get(&region) {
            Some(existing) => existing.hull(&offsets),
            None => offsets,
        };
        self.regions.insert(region, joined);
        Ok(self)
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn items(&self) -> impl Iterator<Item = (&Region, &StridedInterval)> {
        self.regions.iter()
    }

    pub fn get(&self, region: &str) -> Option<&StridedInterval> {
        self.regions.get(&Region::new(region))
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn reversed_raw(&self) -> Self {
        Self {
            reversed: false,
            ..self.clone()
        }
    }

    /// The only region and its offsets, if there is exactly one
    pub fn single_region(&self) -> Option<(&Region, &StridedInterval)> {
        let mut items = self.regions.iter();
        match (items.next(), items.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// A lazily reversed value set keeps its regions but loses all offset information
    pub(crate) fn effective(&self) -> Self {
        if !self.reversed {
            return self.clone();
        }
        Self {
            bits: self.bits,
            regions: self
                .regions
                .keys()
                .map(|r| (*r, StridedInterval::full(self.bits)))
                .collect(),
            reversed: false,
        }
    }

    fn check_same_width(&self, other: &Self) -> Result<(), DomainError> {
        if self.bits == other.bits {
            Ok(())
        } else {
            Err(DomainError::WidthMismatch(self.bits, other.bits))
        }
    }

    /// Combine region maps. Two reversed operands are combined raw and reversed again.
    fn combine(
        &self,
        other: &Self,
        f: impl Fn(&RegionMap, &RegionMap) -> Result<RegionMap, DomainError>,
    ) -> Result<Self, DomainError> {
        self.check_same_width(other)?;
        let both_reversed = self.reversed && other.reversed;
        let (a, b) = if both_reversed {
            (self.reversed_raw(), other.reversed_raw())
        } else {
            (self.effective(), other.effective())
        };
        let regions = f(&a.regions, &b.regions)?
            .into_iter()
            .filter(|(_, offsets)| !offsets.is_empty())
            .collect();
        Ok(Self {
            bits: self.bits,
            regions,
            reversed: both_reversed,
        })
    }

    pub fn union(&self, other: &Self) -> Result<Self, DomainError> {
        self.combine(other, |a, b| {
            let mut out = a.clone();
            for (region, offsets) in b {
                let joined = match out.get(region) {
                    Some(existing) => existing.hull(offsets),
                    None => offsets.clone(),
                };
                out.insert(*region, joined);
            }
            Ok(out)
        })
    }

    /// Only regions present on both sides survive
    pub fn intersection(&self, other: &Self) -> Result<Self, DomainError> {
        self.combine(other, |a, b| {
            Ok(a.iter()
                .filter_map(|(region, offsets)| {
                    b.get(region).map(|o| (*region, offsets.overlap(o)))
                })
                .collect())
        })
    }

    /// Region-wise widening; regions that only appear on one side are kept as they are
    pub fn widen(&self, new: &Self) -> Result<Self, DomainError> {
        self.combine(new, |old, new| {
            let mut out = old.clone();
            for (region, offsets) in new {
                let widened = match old.get(region) {
                    Some(previous) => previous.widen(offsets)?,
                    None => offsets.clone(),
                };
                out.insert(*region, widened);
            }
            Ok(out)
        })
    }

    fn map_regions(
        &self,
        bits: u32,
        f: impl Fn(&StridedInterval) -> Result<StridedInterval, DomainError>,
    ) -> Result<Self, DomainError> {
        let regions = self
            .effective()
            .regions
            .iter()
            .map(|(region, offsets)| -> Result<_, DomainError> { Ok((*region, f(offsets)?)) })
            .collect::<Result<RegionMap, _>>()?;
        Ok(Self {
            bits,
            regions,
            reversed: false,
        })
    }

    pub fn extract(&self, high: u32, low: u32) -> Result<Self, DomainError> {
        if low > high || high >= self.bits {
            return Err(DomainError::InvalidBitRange {
                high,
                low,
                bits: self.bits,
            });
        }
        self.map_regions(high - low + 1, |o| o.extract(high, low))
    }

    pub fn lshr(&self, amount: &StridedInterval) -> Result<Self, DomainError> {
        self.map_regions(self.bits, |o| o.lshr(amount))
    }

    /// Byte-order reversal, always lazy
    pub fn reverse(&self) -> Result<Self, DomainError> {
        if self.bits == 8 {
            return Ok(self.clone());
        }
        if self.bits % 8 != 0 {
            return Err(DomainError::UnalignedReverse(self.bits));
        }
        Ok(Self {
            reversed: !self.reversed,
            ..self.clone()
        })
    }

    /// Up to `n` offsets, region by region
    pub fn eval(&self, n: usize) -> Vec<u128> {
        let samples = self.regions.values().flat_map(|o| o.eval(n)).take(n);
        if self.reversed {
            samples
                .map(|v| swap_bytes(v, self.bits).unwrap_or(v))
                .collect()
        } else {
            samples.collect()
        }
    }

    pub fn unique(&self) -> bool {
        self.single_region().is_some_and(|(_, o)| o.unique())
    }

    /// Whether any region's offsets meet `candidate`
    pub fn intersects(&self, candidate: &StridedInterval) -> bool {
        self.effective()
            .regions
            .values()
            .any(|o| !o.overlap(candidate).is_empty())
    }

    pub fn identical(&self, other: &Self) -> bool {
        self.bits == other.bits
            && self.reversed == other.reversed
            && self.regions.len() == other.regions.len()
            && self
                .regions
                .iter()
                .zip(&other.regions)
                .all(|((ra, a), (rb, b))| ra == rb && a.identical(b))
    }
}
