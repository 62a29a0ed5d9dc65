//! A set of named values.
use crate::error::CurioError;
use anyhow::Result;
use chrono::prelude::{DateTime, Local};
use std::{
    collections::{
        hash_map::{IntoIter, Iter, Keys},
        HashMap,
    },
    iter::IntoIterator,
};

/// A value in a [`Record`].
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// A scalar.
    Scalar(f32),

    /// A date and time.
    DateTime(DateTime<Local>),

    /// A one-dimensional array.
    Array1(Vec<f32>),

    /// A string.
    String(String),
}

/// A set of named values, typically produced by one training or environment
/// step.
#[derive(Debug, Clone)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: AsRef<str>>(slice: &[(K, RecordValue)]) -> Self {
        Self(
            slice
                .iter()
                .map(|(k, v)| (k.as_ref().to_string(), v.clone()))
                .collect(),
        )
    }

    /// Creates a record with a single scalar entry.
    pub fn from_scalar<K: AsRef<str>>(key: K, value: f32) -> Self {
        Self::from_slice(&[(key, RecordValue::Scalar(value))])
    }

    /// Inserts a value.
    pub fn insert(&mut self, key: impl Into<String>, value: RecordValue) {
        self.0.insert(key.into(), value);
    }

    /// Gets a value by key.
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.0.get(key)
    }

    /// Merges the entries of another record into this record.
    pub fn merge_inplace(&mut self, record: Record) {
        for (k, v) in record.0 {
            self.0.insert(k, v);
        }
    }

    /// Returns an iterator over entries.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Returns an iterator over keys.
    pub fn keys(&self) -> Keys<'_, String, RecordValue> {
        self.0.keys()
    }

    /// True when the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets a scalar value by key.
    pub fn get_scalar(&self, key: &str) -> Result<f32> {
        match self.0.get(key) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(CurioError::RecordValueType(key.to_string()).into()),
            None => Err(CurioError::RecordKey(key.to_string()).into()),
        }
    }

    /// Gets a date-time value by key.
    pub fn get_datetime(&self, key: &str) -> Result<DateTime<Local>> {
        match self.0.get(key) {
            Some(RecordValue::DateTime(v)) => Ok(*v),
            Some(_) => Err(CurioError::RecordValueType(key.to_string()).into()),
            None => Err(CurioError::RecordKey(key.to_string()).into()),
        }
    }

    /// Gets a one-dimensional array by key.
    pub fn get_array1(&self, key: &str) -> Result<Vec<f32>> {
        match self.0.get(key) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(CurioError::RecordValueType(key.to_string()).into()),
            None => Err(CurioError::RecordKey(key.to_string()).into()),
        }
    }

    /// Gets a string value by key.
    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.0.get(key) {
            Some(RecordValue::String(v)) => Ok(v.clone()),
            Some(_) => Err(CurioError::RecordValueType(key.to_string()).into()),
            None => Err(CurioError::RecordKey(key.to_string()).into()),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, RecordValue);
    type IntoIter = IntoIter<String, RecordValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordValue};

    #[test]
    fn access_by_key_and_type() {
        let mut record = Record::from_scalar("loss", 0.5);
        record.insert("note", RecordValue::String("warmup".to_string()));

        assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
        assert_eq!(record.get_string("note").unwrap(), "warmup");
        assert!(record.get_scalar("note").is_err());
        assert!(record.get_scalar("missing").is_err());
    }

    #[test]
    fn merge_overwrites() {
        let mut r1 = Record::from_scalar("loss", 1.0);
        let r2 = Record::from_scalar("loss", 2.0);
        r1.merge_inplace(r2);
        assert_eq!(r1.get_scalar("loss").unwrap(), 2.0);
    }
}
