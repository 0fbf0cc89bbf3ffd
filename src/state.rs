//! The single owner of preferences and records.
//!
//! [`AppState`] starts `Uninitialized` with defaults, moves through `Loading`
//! to `Ready` in [`AppState::load`], and stays `Ready` for the rest of the
//! process. Until then it hands out no values and accepts no mutations, so a
//! consumer can never mistake a default for a saved value.
//!
//! Mutations take `&mut self` and return after their write has settled. The
//! caller must not issue the next mutation before the previous one returns;
//! the store assumes it is the only writer of its keys.
//!
//! Changes are published as [`StoreEvent`]s on an internal queue that the
//! presentation layer drains with [`AppState::drain_events`]. An event is
//! queued after the write is attempted, even if the write failed, because the
//! in-memory state changed either way.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::StoreError;
use crate::keys;
use crate::preferences::{PreferenceSet, PreferenceStore, ThemeMode};
use crate::records::{ProfileRecord, RecordStore};
use crate::storage::Storage;

/// Lifecycle of an [`AppState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    PhaseChanged(Phase),
    /// All preferences after a setter ran.
    PreferencesChanged(PreferenceSet),
    /// The full record list after an insert, delete or clear.
    RecordsChanged(Vec<ProfileRecord>),
}

/// What `load` had to work around.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Preference keys that were missing or unreadable and took their default.
    pub defaulted_keys: Vec<&'static str>,
    /// Positions in the stored profile list that could not be decoded.
    pub skipped_records: Vec<usize>,
}

#[derive(Debug)]
pub struct AppState {
    storage: Arc<dyn Storage>,
    phase: Phase,
    preferences: PreferenceStore,
    records: RecordStore,
    events: Vec<StoreEvent>,
}

impl AppState {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        let storage: Arc<dyn Storage> = Arc::from(storage);
        Self {
            preferences: PreferenceStore::new(Arc::clone(&storage)),
            records: RecordStore::new(Arc::clone(&storage)),
            storage,
            phase: Phase::Uninitialized,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Reads all four keys and moves to `Ready`.
    ///
    /// Runs once per process; later calls change nothing and return an empty
    /// report. Never fails: unreadable values fall back to defaults.
    pub fn load(&mut self) -> LoadReport {
        if self.phase != Phase::Uninitialized {
            return LoadReport::default();
        }
        self.set_phase(Phase::Loading);
        tracing::debug!("Loading profile store from {}", self.storage_path());

        let report = LoadReport {
            defaulted_keys: self.preferences.load(),
            skipped_records: self.records.load(),
        };

        self.set_phase(Phase::Ready);
        report
    }

    /// `None` until loading has finished.
    pub fn preferences(&self) -> Option<&PreferenceSet> {
        self.is_ready().then(|| self.preferences.values())
    }

    /// Records, newest first. `None` until loading has finished.
    pub fn records(&self) -> Option<&VecDeque<ProfileRecord>> {
        self.is_ready().then(|| self.records.records())
    }

    pub fn set_theme_mode(&mut self, mode: ThemeMode) -> Result<(), StoreError> {
        self.ensure_ready()?;
        let result = self.preferences.set_theme_mode(mode);
        self.notify_preferences();
        Ok(result?)
    }

    pub fn set_font_scale(&mut self, scale: f64) -> Result<(), StoreError> {
        self.ensure_ready()?;
        let result = self.preferences.set_font_scale(scale);
        self.notify_preferences();
        Ok(result?)
    }

    pub fn set_language(&mut self, code: impl Into<String>) -> Result<(), StoreError> {
        self.ensure_ready()?;
        let result = self.preferences.set_language(code.into());
        self.notify_preferences();
        Ok(result?)
    }

    pub fn insert_front(&mut self, record: ProfileRecord) -> Result<(), StoreError> {
        self.ensure_ready()?;
        let result = self.records.insert_front(record);
        self.notify_records();
        Ok(result?)
    }

    /// Removes the record at `index`. Out of range is a no-op returning
    /// `Ok(None)` with no event.
    pub fn delete_at(&mut self, index: usize) -> Result<Option<ProfileRecord>, StoreError> {
        self.ensure_ready()?;
        if index >= self.records.len() {
            return Ok(None);
        }
        let result = self.records.delete_at(index);
        self.notify_records();
        Ok(result?)
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.ensure_ready()?;
        let result = self.records.clear_all();
        self.notify_records();
        Ok(result?)
    }

    /// Takes every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    /// Where the backend keeps the profile list, for display.
    pub fn storage_path(&self) -> String {
        self.storage.get_path(keys::PROFILES)
    }

    fn ensure_ready(&self) -> Result<(), StoreError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(StoreError::NotReady)
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.events.push(StoreEvent::PhaseChanged(phase));
    }

    fn notify_preferences(&mut self) {
        let snapshot = self.preferences.values().clone();
        self.events.push(StoreEvent::PreferencesChanged(snapshot));
    }

    fn notify_records(&mut self) {
        let snapshot = self.records.records().iter().cloned().collect();
        self.events.push(StoreEvent::RecordsChanged(snapshot));
    }
}
