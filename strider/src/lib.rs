mod backend;
mod config;
mod error;
pub mod expr;
pub mod normalize;
mod ops;
pub mod query;
pub mod registry;

pub use strider_domain as domain;

pub use backend::Backend;
pub use config::BackendConfig;
pub use error::BackendError;
pub use expr::{Datum, Expr, Op, Value};
pub use query::Witness;
