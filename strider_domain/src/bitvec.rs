use crate::bits::{check_width, mask};
use crate::DomainError;
use serde::{Deserialize, Serialize};

/// A fully known bit-vector of a fixed width
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct BitVec {
    bits: u32,
    value: u128,
}

impl BitVec {
    /// `value` is truncated to `bits`
    pub fn new(bits: u32, value: u128) -> Result<Self, DomainError> {
        check_width(bits)?;
        Ok(Self {
            bits,
            value: value & mask(bits),
        })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn value(&self) -> u128 {
        self.value
    }
}
