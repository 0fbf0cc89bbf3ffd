//! Profile records, newest first, stored as one list of JSON objects.

use std::collections::{BTreeMap, VecDeque};
use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::keys;
use crate::storage::Storage;

/// One stored profile.
///
/// The store accepts any combination of fields; validation belongs to the
/// form that builds the record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Fields this version does not know about, written back unchanged.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ProfileRecord {
    /// A record with all five fields set.
    pub fn new(
        name: impl Into<String>,
        major: impl Into<String>,
        year: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            major: Some(major.into()),
            year: Some(year.into()),
            email: Some(email.into()),
            phone: Some(phone.into()),
            extra: BTreeMap::new(),
        }
    }
}

/// Ordered profile records bound to a backend.
///
/// Every mutation rewrites the whole list under [`keys::PROFILES`]; the
/// backend only supports whole-value writes.
#[derive(Debug)]
pub struct RecordStore {
    storage: Arc<dyn Storage>,
    records: VecDeque<ProfileRecord>,
}

impl RecordStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            records: VecDeque::new(),
        }
    }

    /// Records, most recently added first.
    pub fn records(&self) -> &VecDeque<ProfileRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replaces the in-memory list with the stored one.
    ///
    /// Elements that fail to decode are skipped and logged. An unreadable list
    /// loads as empty.
    ///
    /// Returns the positions of the skipped elements in the stored list, not
    /// the records; read those through `records()`.
    pub fn load(&mut self) -> Vec<usize> {
        let encoded = match self.storage.get_string_list(keys::PROFILES) {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Stored profile list is unreadable, starting empty: {}", e);
                Vec::new()
            }
        };

        let mut skipped = Vec::new();
        self.records = encoded
            .iter()
            .enumerate()
            .filter_map(|(index, text)| match serde_json::from_str(text) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping unreadable profile record at {}: {}", index, e);
                    skipped.push(index);
                    None
                }
            })
            .collect();
        skipped
    }

    /// Puts `record` at the front and rewrites the stored list.
    pub fn insert_front(&mut self, record: ProfileRecord) -> Result<(), PersistError> {
        self.records.push_front(record);
        self.persist()
    }

    /// Removes the record at `index` and rewrites the stored list.
    ///
    /// An index past the end is a no-op: nothing is written and `Ok(None)` is
    /// returned.
    pub fn delete_at(&mut self, index: usize) -> Result<Option<ProfileRecord>, PersistError> {
        let Some(removed) = self.records.remove(index) else {
            return Ok(None);
        };
        self.persist()?;
        Ok(Some(removed))
    }

    /// Empties the list and removes its key from the backend.
    pub fn clear_all(&mut self) -> Result<(), PersistError> {
        self.records.clear();
        self.storage.remove(keys::PROFILES).map_err(|e| {
            tracing::warn!("Failed to remove stored profiles: {}", e);
            PersistError::new(keys::PROFILES, e)
        })
    }

    fn persist(&self) -> Result<(), PersistError> {
        let encoded = self
            .records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                PersistError::new(keys::PROFILES, io::Error::new(io::ErrorKind::InvalidData, e))
            })?;
        self.storage
            .set_string_list(keys::PROFILES, &encoded)
            .map_err(|e| {
                tracing::warn!("Failed to persist {} profiles: {}", encoded.len(), e);
                PersistError::new(keys::PROFILES, e)
            })
    }
}
