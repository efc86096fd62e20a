//! Width-aware integer helpers shared by the abstract domains.
//!
//! All values are carried as `u128` holding the unsigned interpretation of a bit-vector of some
//! width in `1..=128`.

use crate::DomainError;

pub const MAX_BITS: u32 = 128;

pub(crate) fn check_width(bits: u32) -> Result<(), DomainError> {
    if bits == 0 || bits > MAX_BITS {
        Err(DomainError::InvalidWidth(bits))
    } else {
        Ok(())
    }
}

/// All-ones value of the given width
pub fn mask(bits: u32) -> u128 {
    if bits >= MAX_BITS {
        u128::MAX
    } else {
        (1u128 << bits) - 1
    }
}

/// The value with only the sign bit of the given width set
pub(crate) fn sign_bit(bits: u32) -> u128 {
    1u128 << (bits - 1)
}

/// Reinterpret the low `bits` bits of `value` as a two's complement number
pub fn to_signed(value: u128, bits: u32) -> i128 {
    let shift = MAX_BITS - bits;
    ((value << shift) as i128) >> shift
}

pub(crate) fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Smallest `x >= floor` with `x ≡ base (mod stride)`; requires `floor >= base`
pub(crate) fn align_up(floor: u128, base: u128, stride: u128) -> Option<u128> {
    if stride == 0 {
        return (floor == base).then_some(base);
    }
    let rem = (floor - base) % stride;
    if rem == 0 {
        Some(floor)
    } else {
        floor.checked_add(stride - rem)
    }
}

/// Largest `x <= ceiling` with `x ≡ base (mod stride)`; requires `ceiling >= base`
pub(crate) fn align_down(ceiling: u128, base: u128, stride: u128) -> u128 {
    if stride == 0 {
        return base;
    }
    ceiling - (ceiling - base) % stride
}

/// Swap the byte order of the low `bits` bits of `value`
pub(crate) fn swap_bytes(value: u128, bits: u32) -> Result<u128, DomainError> {
    if bits % 8 != 0 {
        return Err(DomainError::UnalignedReverse(bits));
    }
    Ok(value.swap_bytes() >> (MAX_BITS - bits))
}
