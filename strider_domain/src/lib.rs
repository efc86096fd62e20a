pub mod bits;
mod bitvec;
mod bool_result;
mod comparison;
mod display;
pub(crate) mod error;
mod interval;
mod set;
mod value;
mod value_set;

pub use bitvec::BitVec;
pub use bool_result::BoolResult;
pub use comparison::Comparison;
pub use error::DomainError;
pub use interval::StridedInterval;
pub use set::{DiscreteIntervalSet, MAX_MEMBERS};
pub use value::{AbstractValue, Pair, Shape};
pub use value_set::{GLOBAL_REGION, Region, ValueSet};
