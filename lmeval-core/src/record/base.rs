//! Base implementation of records for logging.
use crate::error::EvalError;
use std::collections::{hash_map::Iter, HashMap};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single floating-point value, typically an aggregated metric.
    Scalar(f32),
}

/// A container of named metrics, optionally tagged with a training step.
///
/// The step is kept apart from the values so that it is never rounded
/// through `f32`.
///
/// # Examples
///
/// ```rust
/// use lmeval_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("mean_score", 0.5).with_step(100);
/// record.insert("max_score", RecordValue::Scalar(0.95));
/// assert_eq!(record.get_scalar("max_score").unwrap(), 0.95);
/// assert_eq!(record.step(), Some(100));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record {
    step: Option<usize>,
    values: HashMap<String, RecordValue>,
}

impl Record {
    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self {
            step: None,
            values: HashMap::from([(name.into(), RecordValue::Scalar(value))]),
        }
    }

    /// Tags the record with a training step.
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    /// The training step of the record, if tagged.
    pub fn step(&self) -> Option<usize> {
        self.step
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.values.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.values.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.values.get(k)
    }

    /// Gets a scalar value from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist.
    pub fn get_scalar(&self, k: &str) -> Result<f32, EvalError> {
        match self.values.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            None => Err(EvalError::RecordKeyError(k.to_string())),
        }
    }

    /// Checks if the record holds no value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let record = Record::from_scalar("mean_score", 1.0);
        assert!(record.get("max_score").is_none());
        assert!(matches!(
            record.get_scalar("score"),
            Err(EvalError::RecordKeyError(k)) if k == "score"
        ));
    }

    #[test]
    fn test_step_is_exact() {
        // Not representable as f32.
        let step = 16_777_217;
        let mut record = Record::from_scalar("mean_score", 1.0).with_step(step);
        record.insert("mean_score", RecordValue::Scalar(2.0));

        assert_eq!(record.step(), Some(step));
        assert_eq!(record.get_scalar("mean_score").unwrap(), 2.0);
        assert_eq!(record.iter().count(), 1);
        assert!(!record.is_empty());
        assert_eq!(Record::default().step(), None);
    }
}
