//! In-memory storage aggregating records.
use super::{Record, RecordValue};
use std::collections::HashSet;

/// Stores records and aggregates their scalar entries.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// The number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Aggregates the stored records into a single record and clears the
    /// storage.
    ///
    /// Scalar entries sharing a key are averaged over the records in which
    /// the key appears. Non-scalar entries keep the value of the most
    /// recently stored record.
    pub fn aggregate(&mut self) -> Record {
        let keys: HashSet<String> = self
            .data
            .iter()
            .flat_map(|r| r.keys().cloned())
            .collect();
        let mut record = Record::empty();

        for key in keys {
            let mut scalars = vec![];
            let mut latest: Option<&RecordValue> = None;
            for r in self.data.iter() {
                match r.get(&key) {
                    Some(RecordValue::Scalar(v)) => scalars.push(*v),
                    Some(v) => latest = Some(v),
                    None => {}
                }
            }
            if !scalars.is_empty() {
                let mean = scalars.iter().sum::<f32>() / scalars.len() as f32;
                record.insert(key, RecordValue::Scalar(mean));
            } else if let Some(v) = latest {
                record.insert(key, v.clone());
            }
        }

        self.data = vec![];
        record
    }
}
