use crate::bits::{
    align_down, align_up, check_width, gcd, mask, sign_bit, swap_bytes, to_signed,
};
use crate::{BitVec, BoolResult, Comparison, DomainError};
use internment::Intern;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::hash::{Hash, Hasher};

/// A bit-width-tagged strided interval: every value `lower + k * stride` with
/// `lower <= value <= upper`, all unsigned and non-wrapping.
///
/// Normal form: singletons have stride 0, everything else has a non-zero stride with `upper`
/// reachable from `lower`. The empty interval is bottom.
///
/// A non-singleton interval can be *reversed*: it then denotes the byte-swapped image of its
/// stored range. Reversal is lazy because a byte-swapped range is not itself an interval;
/// singletons are always reversed eagerly.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct StridedInterval {
    bits: u32,
    stride: u128,
    lower: u128,
    upper: u128,
    empty: bool,
    reversed: bool,
    name: Option<Intern<String>>,
}

// Names are metadata: they take part in `identical` but not in equality.
impl PartialEq for StridedInterval {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
            && self.stride == other.stride
            && self.lower == other.lower
            && self.upper == other.upper
            && self.empty == other.empty
            && self.reversed == other.reversed
    }
}

impl Hash for StridedInterval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
        self.stride.hash(state);
        self.lower.hash(state);
        self.upper.hash(state);
        self.empty.hash(state);
        self.reversed.hash(state);
    }
}

impl StridedInterval {
    /// Build `[lower, upper]` with the given stride. Bounds are truncated to `bits`.
    pub fn new(bits: u32, stride: u128, lower: u128, upper: u128) -> Result<Self, DomainError> {
        check_width(bits)?;
        let (lower, upper) = (lower & mask(bits), upper & mask(bits));
        if lower > upper {
            return Err(DomainError::InvertedBounds { lower, upper });
        }
        Ok(Self::normalized(bits, stride, lower, upper))
    }

    pub fn point(bits: u32, value: u128) -> Result<Self, DomainError> {
        check_width(bits)?;
        Ok(Self::constant(bits, value))
    }

    /// The unconstrained interval of a width
    pub fn top(bits: u32) -> Result<Self, DomainError> {
        check_width(bits)?;
        Ok(Self::full(bits))
    }

    pub fn empty(bits: u32) -> Result<Self, DomainError> {
        check_width(bits)?;
        Ok(Self::bottom(bits))
    }

    /// The summary range of a named symbolic variable
    pub fn named(
        name: &str,
        bits: u32,
        lower: u128,
        upper: u128,
        stride: u128,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(bits, stride, lower, upper)?.with_name(name))
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(Intern::new(name.to_string()));
        self
    }

    pub(crate) fn normalized(bits: u32, stride: u128, lower: u128, upper: u128) -> Self {
        let (stride, upper) = if lower == upper {
            (0, upper)
        } else {
            let stride = stride.max(1);
            let upper = align_down(upper, lower, stride);
            (if upper == lower { 0 } else { stride }, upper)
        };
        Self {
            bits,
            stride,
            lower,
            upper,
            empty: false,
            reversed: false,
            name: None,
        }
    }

    pub(crate) fn constant(bits: u32, value: u128) -> Self {
        let value = value & mask(bits);
        Self::normalized(bits, 0, value, value)
    }

    pub(crate) fn full(bits: u32) -> Self {
        Self::normalized(bits, 1, 0, mask(bits))
    }

    pub(crate) fn bottom(bits: u32) -> Self {
        Self {
            bits,
            stride: 0,
            lower: 0,
            upper: 0,
            empty: true,
            reversed: false,
            name: None,
        }
    }

    pub fn min_int(_bits: u32) -> u128 {
        0
    }

    pub fn max_int(bits: u32) -> u128 {
        mask(bits)
    }

    pub fn signed_min_int(bits: u32) -> i128 {
        to_signed(sign_bit(bits), bits)
    }

    pub fn signed_max_int(bits: u32) -> i128 {
        to_signed(sign_bit(bits) - 1, bits)
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn stride(&self) -> u128 {
        self.stride
    }

    pub fn lower_bound(&self) -> u128 {
        self.lower
    }

    pub fn upper_bound(&self) -> u128 {
        self.upper
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn is_top(&self) -> bool {
        !self.empty && !self.reversed && self.lower == 0 && self.upper == mask(self.bits) && self.stride <= 1
    }

    /// Whether exactly one concrete value is denoted
    pub fn unique(&self) -> bool {
        !self.empty && self.lower == self.upper
    }

    /// Number of members, saturating at `u128::MAX`
    pub fn cardinality(&self) -> u128 {
        if self.empty {
            0
        } else if self.stride == 0 {
            1
        } else {
            ((self.upper - self.lower) / self.stride).saturating_add(1)
        }
    }

    pub fn contains(&self, value: u128) -> bool {
        let this = self.effective();
        !this.empty
            && value >= this.lower
            && value <= this.upper
            && (this.stride == 0 || (value - this.lower) % this.stride == 0)
    }

    /// Structural identity, including the symbolic name
    pub fn identical(&self, other: &Self) -> bool {
        self == other && self.name == other.name
    }

    /// The stored range with the reversed flag cleared
    pub fn reversed_raw(&self) -> Self {
        let mut raw = self.stripped();
        raw.reversed = false;
        raw
    }

    /// A view of this interval whose stored bounds are its actual members. A lazily reversed
    /// interval has no such representation short of top.
    pub(crate) fn effective(&self) -> Cow<'_, Self> {
        if self.reversed {
            Cow::Owned(Self::full(self.bits))
        } else {
            Cow::Borrowed(self)
        }
    }

    fn stripped(&self) -> Self {
        Self {
            name: None,
            ..self.clone()
        }
    }

    fn check_same_width(&self, other: &Self) -> Result<(), DomainError> {
        if self.bits == other.bits {
            Ok(())
        } else {
            Err(DomainError::WidthMismatch(self.bits, other.bits))
        }
    }

    /// Apply a binary lattice operation. Two reversed operands are combined on their stored
    /// ranges and the result is reversed again; a single reversed operand is treated as top.
    fn lattice_op(&self, other: &Self, op: impl Fn(&Self, &Self) -> Self) -> Self {
        if self.reversed && other.reversed {
            let raw = op(&self.reversed_raw(), &other.reversed_raw());
            raw.reverse().unwrap_or_else(|_| Self::full(raw.bits))
        } else {
            op(&self.effective(), &other.effective())
        }
    }

    pub fn union(&self, other: &Self) -> Result<Self, DomainError> {
        self.check_same_width(other)?;
        Ok(self.lattice_op(other, Self::join))
    }

    pub fn intersection(&self, other: &Self) -> Result<Self, DomainError> {
        self.check_same_width(other)?;
        Ok(self.lattice_op(other, Self::meet))
    }

    /// Widen `self` (the previous iterate) by `new`. Any bound that moved is pushed to the
    /// limit of the width, so repeated widening stabilizes after a bounded number of steps.
    pub fn widen(&self, new: &Self) -> Result<Self, DomainError> {
        self.check_same_width(new)?;
        Ok(self.lattice_op(new, Self::extrapolate))
    }

    /// `union` for operands already known to share a width
    pub(crate) fn hull(&self, other: &Self) -> Self {
        self.lattice_op(other, Self::join)
    }

    /// `intersection` for operands already known to share a width
    pub(crate) fn overlap(&self, other: &Self) -> Self {
        self.lattice_op(other, Self::meet)
    }

    fn join(a: &Self, b: &Self) -> Self {
        if a.empty {
            return b.stripped();
        }
        if b.empty {
            return a.stripped();
        }
        let stride = gcd(gcd(a.stride, b.stride), a.lower.abs_diff(b.lower));
        Self::normalized(a.bits, stride, a.lower.min(b.lower), a.upper.max(b.upper))
    }

    fn meet(a: &Self, b: &Self) -> Self {
        if a.empty || b.empty {
            return Self::bottom(a.bits);
        }
        if a.unique() {
            return if b.contains(a.lower) {
                a.stripped()
            } else {
                Self::bottom(a.bits)
            };
        }
        if b.unique() {
            return if a.contains(b.lower) {
                b.stripped()
            } else {
                Self::bottom(a.bits)
            };
        }
        let (lo, hi) = (a.lower.max(b.lower), a.upper.min(b.upper));
        if lo > hi || a.lower.abs_diff(b.lower) % gcd(a.stride, b.stride) != 0 {
            return Self::bottom(a.bits);
        }
        // Members of the meet are members of the coarser-strided operand.
        let (base, stride) = if a.stride >= b.stride {
            (a.lower, a.stride)
        } else {
            (b.lower, b.stride)
        };
        match align_up(lo, base, stride) {
            Some(first) if first <= hi => {
                Self::normalized(a.bits, stride, first, align_down(hi, base, stride))
            }
            _ => Self::bottom(a.bits),
        }
    }

    fn extrapolate(old: &Self, new: &Self) -> Self {
        if old.empty {
            return new.stripped();
        }
        if new.empty {
            return old.stripped();
        }
        let stride = gcd(gcd(old.stride, new.stride), old.lower.abs_diff(new.lower));
        if stride == 0 {
            return old.stripped();
        }
        let lower = if new.lower < old.lower {
            old.lower % stride
        } else {
            old.lower
        };
        let upper = if new.upper > old.upper {
            align_down(mask(old.bits), lower, stride)
        } else {
            old.upper
        };
        Self::normalized(old.bits, stride, lower, upper)
    }

    /// Signed hull of the members
    pub(crate) fn signed_bounds(&self) -> (i128, i128) {
        let half = sign_bit(self.bits);
        if self.lower < half && self.upper >= half {
            let first_negative = align_up(half, self.lower, self.stride).unwrap_or(self.upper);
            let last_positive = align_down(half - 1, self.lower, self.stride);
            (
                to_signed(first_negative, self.bits),
                to_signed(last_positive, self.bits),
            )
        } else {
            (
                to_signed(self.lower, self.bits),
                to_signed(self.upper, self.bits),
            )
        }
    }

    pub fn compare(&self, cmp: Comparison, other: &Self) -> Result<BoolResult, DomainError> {
        self.check_same_width(other)?;
        let (a, b) = (self.effective(), other.effective());
        if a.empty || b.empty {
            return Ok(BoolResult::Maybe);
        }
        Ok(if cmp.is_signed() {
            cmp.decide(a.signed_bounds(), b.signed_bounds())
        } else {
            cmp.decide((a.lower, a.upper), (b.lower, b.upper))
        })
    }

    /// Bits `[low, high]` inclusive, counted from the least significant bit
    pub fn extract(&self, high: u32, low: u32) -> Result<Self, DomainError> {
        if low > high || high >= self.bits {
            return Err(DomainError::InvalidBitRange {
                high,
                low,
                bits: self.bits,
            });
        }
        let width = high - low + 1;
        let this = self.effective();
        if this.empty {
            return Ok(Self::bottom(width));
        }
        if width == self.bits {
            return Ok(this.stripped());
        }
        if this.unique() {
            return Ok(Self::constant(width, this.lower >> low));
        }
        let (lo, hi) = (this.lower >> low, this.upper >> low);
        if lo >> width != hi >> width {
            return Ok(Self::full(width));
        }
        Ok(Self::normalized(
            width,
            shifted_stride(this.stride, low),
            lo & mask(width),
            hi & mask(width),
        ))
    }

    /// `self` as the high part, `low` as the low part
    pub fn concat(&self, low: &Self) -> Result<Self, DomainError> {
        let total = self.bits + low.bits;
        check_width(total)?;
        let (a, b) = (self.effective(), low.effective());
        if a.empty || b.empty {
            return Ok(Self::bottom(total));
        }
        let n = b.bits;
        Ok(Self::normalized(
            total,
            gcd(a.stride << n, b.stride),
            (a.lower << n) | b.lower,
            (a.upper << n) | b.upper,
        ))
    }

    fn check_extension(&self, total: u32) -> Result<(), DomainError> {
        check_width(total)?;
        if total < self.bits {
            return Err(DomainError::InvalidWidth(total));
        }
        Ok(())
    }

    /// Extend to `total` bits, filling the new high bits with zero
    pub fn zero_extend(&self, total: u32) -> Result<Self, DomainError> {
        self.check_extension(total)?;
        let this = self.effective();
        if this.empty {
            return Ok(Self::bottom(total));
        }
        Ok(Self::normalized(total, this.stride, this.lower, this.upper))
    }

    /// Extend to `total` bits, replicating the sign bit into the new high bits
    pub fn sign_extend(&self, total: u32) -> Result<Self, DomainError> {
        self.check_extension(total)?;
        let this = self.effective();
        if this.empty {
            return Ok(Self::bottom(total));
        }
        let half = sign_bit(self.bits);
        let fill = mask(total) - mask(self.bits);
        Ok(if this.upper < half {
            Self::normalized(total, this.stride, this.lower, this.upper)
        } else if this.lower >= half {
            Self::normalized(total, this.stride, this.lower + fill, this.upper + fill)
        } else {
            Self::normalized(total, gcd(this.stride, fill), this.lower, this.upper + fill)
        })
    }

    /// Logical right shift by every amount `amount` admits
    pub fn lshr(&self, amount: &Self) -> Result<Self, DomainError> {
        let (this, amount) = (self.effective(), amount.effective());
        if this.empty || amount.empty {
            return Ok(Self::bottom(self.bits));
        }
        let bits = u128::from(self.bits);
        if amount.unique() {
            if amount.lower >= bits {
                return Ok(Self::constant(self.bits, 0));
            }
            let shift = amount.lower as u32;
            return Ok(Self::normalized(
                self.bits,
                shifted_stride(this.stride, shift),
                this.lower >> shift,
                this.upper >> shift,
            ));
        }
        let lo = if amount.upper >= bits {
            0
        } else {
            this.lower >> amount.upper
        };
        let hi = if amount.lower >= bits {
            0
        } else {
            this.upper >> amount.lower
        };
        Ok(Self::normalized(self.bits, 1, lo, hi))
    }

    /// Byte-order reversal. Eager for singletons and single bytes, lazy otherwise.
    pub fn reverse(&self) -> Result<Self, DomainError> {
        if self.empty || self.bits == 8 {
            return Ok(self.stripped());
        }
        if self.unique() {
            return Ok(Self::constant(self.bits, swap_bytes(self.lower, self.bits)?));
        }
        if self.bits % 8 != 0 {
            return Err(DomainError::UnalignedReverse(self.bits));
        }
        let mut flipped = self.stripped();
        flipped.reversed = !flipped.reversed;
        Ok(flipped)
    }

    /// Up to `n` members in ascending order of their stored value
    pub fn eval(&self, n: usize) -> Vec<u128> {
        let count = self.cardinality().min(n as u128);
        let members = (0..count).map(|k| self.lower + k * self.stride);
        if self.reversed {
            members
                .map(|v| swap_bytes(v, self.bits).unwrap_or(v))
                .collect()
        } else {
            members.collect()
        }
    }
}

impl From<BitVec> for StridedInterval {
    fn from(value: BitVec) -> Self {
        Self::constant(value.bits(), value.value())
    }
}

/// Stride of `{(l + k * stride) >> shift}`; exact when the shift divides the stride
fn shifted_stride(stride: u128, shift: u32) -> u128 {
    if shift == 0 {
        stride
    } else if stride % (1u128 << shift) == 0 {
        stride >> shift
    } else {
        1
    }
}
