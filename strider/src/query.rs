//! Read-only questions about converted values: samples, bounds, membership and identity.

use crate::normalize::{coerce_bool, fit_literal};
use crate::{Backend, BackendError, Value};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strider_domain::{AbstractValue, StridedInterval};

/// One concrete possibility of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Witness {
    Bits(u128),
    Bool(bool),
}

impl Display for Witness {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Witness::Bits(v) => write!(f, "{v:#x}"),
            Witness::Bool(b) => write!(f, "{b}"),
        }
    }
}

fn unsupported(query: &str, value: &Value) -> BackendError {
    BackendError::UnsupportedExprType(format!("{query} is not defined for {}", value.type_name()))
}

/// The single interval summarizing `value`, for bound queries
fn bounds_of(query: &str, value: &Value) -> Result<StridedInterval, BackendError> {
    let hull = value
        .as_abstract()
        .and_then(AbstractValue::hull)
        .ok_or_else(|| unsupported(query, value))?;
    if hull.is_empty() {
        return Err(BackendError::UnsupportedExprType(format!(
            "{query} of an empty value"
        )));
    }
    Ok(hull)
}

impl Backend {
    /// Up to `n` concrete samples of `value`. Value sets are asked repeatedly until `n`
    /// samples are gathered, at most `sample_rounds` times; samples are not deduplicated.
    pub fn eval(&self, value: &Value, n: usize) -> Result<Vec<Witness>, BackendError> {
        let bits = match value {
            Value::Bool(b) => {
                return Ok(b.values().iter().take(n).map(|b| Witness::Bool(*b)).collect());
            }
            Value::Abstract(AbstractValue::ValueSet(vs)) => {
                let mut samples = Vec::with_capacity(n);
                for round in 0..self.config().sample_rounds {
                    if samples.len() >= n {
                        break;
                    }
                    let batch = vs.eval(n - samples.len());
                    if batch.is_empty() {
                        tracing::warn!(round, "value set produced no further samples");
                        break;
                    }
                    samples.extend(batch);
                }
                if samples.len() < n {
                    tracing::warn!(
                        wanted = n,
                        got = samples.len(),
                        "value set sampling stopped early"
                    );
                }
                samples
            }
            Value::Abstract(v) => v.eval(n),
            other => return Err(unsupported("eval", other)),
        };
        Ok(bits.into_iter().map(Witness::Bits).collect())
    }

    /// Smallest unsigned member; the width's minimum for an unconstrained value
    pub fn min(&self, value: &Value) -> Result<u128, BackendError> {
        let si = bounds_of("min", value)?;
        if si.is_top() {
            return Ok(StridedInterval::min_int(si.bits()));
        }
        Ok(si.lower_bound())
    }

    /// Largest unsigned member; the width's maximum for an unconstrained value
    pub fn max(&self, value: &Value) -> Result<u128, BackendError> {
        let si = bounds_of("max", value)?;
        if si.is_top() {
            return Ok(StridedInterval::max_int(si.bits()));
        }
        Ok(si.upper_bound())
    }

    /// Whether `candidate` may be a concretization of `value`. Integer candidates are taken
    /// at the width of `value` and must fit it.
    pub fn solution(&self, value: &Value, candidate: &Value) -> Result<bool, BackendError> {
        match value {
            Value::Bool(b) => {
                let wanted = coerce_bool(candidate)?;
                Ok(wanted.values().iter().any(|w| b.values().contains(w)))
            }
            Value::Abstract(v) => {
                let candidate = match candidate {
                    Value::Int(i) => {
                        StridedInterval::point(v.bits(), fit_literal(*i, v.bits())?)?
                    }
                    other => bounds_of("solution", other)?,
                };
                Ok(v.intersects(&candidate)?)
            }
            other => Err(unsupported("solution", other)),
        }
    }

    pub fn has_true(&self, value: &Value) -> Result<bool, BackendError> {
        Ok(coerce_bool(value)?.has_true())
    }

    pub fn has_false(&self, value: &Value) -> Result<bool, BackendError> {
        Ok(coerce_bool(value)?.has_false())
    }

    pub fn is_true(&self, value: &Value) -> Result<bool, BackendError> {
        Ok(coerce_bool(value)?.is_true())
    }

    pub fn is_false(&self, value: &Value) -> Result<bool, BackendError> {
        Ok(coerce_bool(value)?.is_false())
    }

    /// Whether exactly one concrete possibility remains
    pub fn unique(&self, value: &Value) -> Result<bool, BackendError> {
        match value {
            Value::Abstract(v) => Ok(v.unique()),
            Value::Bool(b) => Ok(b.values().len() == 1),
            other => Err(unsupported("unique", other)),
        }
    }

    /// Structural identity. Values of different kinds are never identical.
    pub fn identical(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Abstract(a), Value::Abstract(b)) => a.identical(b),
            (a, b) => a == b,
        }
    }

    /// The symbolic name of a named interval
    pub fn name<'a>(&self, value: &'a Value) -> Option<&'a str> {
        value.as_abstract().and_then(AbstractValue::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BackendConfig, Datum, Op};
    use strider_domain::{BoolResult, DiscreteIntervalSet, ValueSet};

    fn si(bits: u32, stride: u128, lower: u128, upper: u128) -> Value {
        Value::Abstract(StridedInterval::new(bits, stride, lower, upper).unwrap().into())
    }

    #[test]
    fn top_bounds() {
        let backend = Backend::new();
        let top = Value::Abstract(StridedInterval::top(8).unwrap().into());
        assert_eq!(backend.min(&top), Ok(0));
        assert_eq!(backend.max(&top), Ok(255));
        assert_eq!(backend.min(&si(8, 2, 4, 10)), Ok(4));
        assert_eq!(backend.max(&si(8, 2, 4, 10)), Ok(10));
        assert!(backend.min(&Value::Int(3)).is_err());
    }

    #[test]
    fn bounds_of_sets_use_the_hull() {
        let backend = Backend::new();
        let set = DiscreteIntervalSet::new(
            8,
            [
                StridedInterval::new(8, 1, 2, 4).unwrap(),
                StridedInterval::new(8, 1, 40, 50).unwrap(),
            ],
        )
        .unwrap();
        let set = Value::Abstract(set.into());
        assert_eq!(backend.min(&set), Ok(2));
        assert_eq!(backend.max(&set), Ok(50));
    }

    #[test]
    fn sampling() {
        let backend = Backend::new();
        let samples = backend.eval(&si(8, 4, 0, 100), 3).unwrap();
        assert_eq!(
            samples,
            vec![Witness::Bits(0), Witness::Bits(4), Witness::Bits(8)]
        );
        assert_eq!(
            backend.eval(&Value::Bool(BoolResult::Maybe), 5).unwrap(),
            vec![Witness::Bool(true), Witness::Bool(false)]
        );
        assert!(backend.eval(&Value::Str("x".into()), 1).is_err());
    }

    #[test]
    fn value_set_sampling_repeats_without_dedup() {
        let backend = Backend::new();
        let vs = ValueSet::new(32)
            .unwrap()
            .with_region("stack", StridedInterval::new(32, 4, 0, 4).unwrap())
            .unwrap();
        let samples = backend.eval(&Value::Abstract(vs.into()), 5).unwrap();
        let expected = [0, 4, 0, 4, 0].map(Witness::Bits);
        assert_eq!(samples, expected);
    }

    #[test]
    fn value_set_sampling_is_capped() {
        let backend = Backend::with_config(BackendConfig { sample_rounds: 2 });
        let vs = ValueSet::new(32)
            .unwrap()
            .with_region("stack", StridedInterval::point(32, 8).unwrap())
            .unwrap();
        let samples = backend.eval(&Value::Abstract(vs.into()), 10).unwrap();
        assert_eq!(samples.len(), 2);

        let empty = Value::Abstract(ValueSet::new(32).unwrap().into());
        assert!(backend.eval(&empty, 3).unwrap().is_empty());
    }

    #[test]
    fn membership() {
        let backend = Backend::new();
        let v = si(8, 4, 0, 16);
        assert_eq!(backend.solution(&v, &Value::Int(8)), Ok(true));
        assert_eq!(backend.solution(&v, &Value::Int(9)), Ok(false));
        assert_eq!(backend.solution(&v, &si(8, 1, 13, 15)), Ok(false));
        assert_eq!(backend.solution(&v, &si(8, 1, 13, 16)), Ok(true));

        let maybe = Value::Bool(BoolResult::Maybe);
        let yes = Value::Bool(BoolResult::True);
        let no = Value::Bool(BoolResult::False);
        assert_eq!(backend.solution(&maybe, &no), Ok(true));
        assert_eq!(backend.solution(&yes, &no), Ok(false));

        let vs = ValueSet::new(8)
            .unwrap()
            .with_region("heap", StridedInterval::new(8, 1, 100, 110).unwrap())
            .unwrap();
        let vs = Value::Abstract(vs.into());
        assert_eq!(backend.solution(&vs, &Value::Int(105)), Ok(true));
        assert_eq!(backend.solution(&vs, &Value::Int(5)), Ok(false));
    }

    #[test]
    fn bounds_of_reversed_values_cover_their_samples() {
        let backend = Backend::new();
        let x = Datum::from(StridedInterval::new(16, 1, 0x100, 0x1ff).unwrap());
        let reversed = backend.call(Op::Reverse, [x], 16).unwrap();
        let (min, max) = (backend.min(&reversed).unwrap(), backend.max(&reversed).unwrap());
        let samples = backend.eval(&reversed, 16).unwrap();
        assert_eq!(samples.first(), Some(&Witness::Bits(0x0001)));
        assert!(samples.iter().all(|w| matches!(w, Witness::Bits(v) if (min..=max).contains(v))));
        assert_eq!(backend.solution(&reversed, &Value::Int(1)), Ok(true));
    }

    #[test]
    fn membership_literals_must_fit() {
        let backend = Backend::new();
        let zero = si(8, 0, 0, 0);
        assert!(matches!(
            backend.solution(&zero, &Value::Int(256)),
            Err(BackendError::UnsupportedArgumentType(_))
        ));
        assert_eq!(backend.solution(&si(8, 0, 0xff, 0xff), &Value::Int(-1)), Ok(true));
    }

    #[test]
    fn truth_predicates() {
        let backend = Backend::new();
        let maybe = Value::Bool(BoolResult::Maybe);
        assert_eq!(backend.has_true(&maybe), Ok(true));
        assert_eq!(backend.has_false(&maybe), Ok(true));
        assert_eq!(backend.is_true(&maybe), Ok(false));
        assert_eq!(backend.is_false(&Value::Bool(BoolResult::False)), Ok(true));
        assert!(backend.has_true(&Value::Int(1)).is_err());
    }

    #[test]
    fn uniqueness_identity_and_names() {
        let backend = Backend::new();
        assert_eq!(backend.unique(&si(8, 0, 3, 3)), Ok(true));
        assert_eq!(backend.unique(&si(8, 1, 3, 4)), Ok(false));

        let point = StridedInterval::point(8, 3).unwrap();
        let as_set = Value::Abstract(DiscreteIntervalSet::from(point.clone()).into());
        let as_interval = Value::Abstract(point.into());
        assert!(!backend.identical(&as_interval, &as_set));
        assert!(backend.identical(&as_interval, &as_interval.clone()));
        assert!(!backend.identical(&Value::Int(3), &as_interval));

        let named = Value::Abstract(StridedInterval::named("rax", 64, 0, 8, 1).unwrap().into());
        assert_eq!(backend.name(&named), Some("rax"));
        assert_eq!(backend.name(&as_set), None);
    }
}
