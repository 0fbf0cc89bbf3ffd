//! # profile_store
//!
//! Local record and preference store for a small profile-keeping app.
//!
//! The crate owns the in-memory state of the app (a newest-first list of
//! profile records and three app-wide preferences) and writes every change
//! straight through to a string-keyed [`Storage`](storage::Storage) backend.
//! On startup a single load reconstructs that state; until it completes the
//! state hands out nothing, so defaults are never mistaken for saved values.
//!
//! The design priorities are:
//!
//! - **Write-through:** a mutation returns after its write has settled, with a
//!   `Result` that says whether it did.
//! - **Tolerant loading:** a missing or corrupt key falls back to its default
//!   and never blocks the other keys. A corrupt record is skipped and logged.
//! - **Safety:** the file backend writes through a temporary file so a crash
//!   mid-write leaves the previous document intact.
//!
//! **Note:** The whole record list is rewritten on every change. This is meant
//! for a handful of records, not a database.
//!
//! ## Example
//!
//! ```rust
//! use profile_store::storage::memory::MemoryStorage;
//! use profile_store::{AppState, ProfileRecord, ThemeMode};
//!
//! let mut state = AppState::new(Box::new(MemoryStorage::new()));
//! state.load();
//!
//! state.insert_front(ProfileRecord::new("Ana", "CS", "2023", "a@x.com", "08123")).unwrap();
//! state.set_theme_mode(ThemeMode::Dark).unwrap();
//!
//! assert_eq!(state.records().unwrap().len(), 1);
//! assert_eq!(state.preferences().unwrap().theme_mode, ThemeMode::Dark);
//! ```

pub mod error;
pub mod preferences;
pub mod records;
pub mod state;
pub mod storage;

pub use error::{LoadError, PersistError, StoreError};
pub use preferences::{PreferenceSet, PreferenceStore, ThemeMode};
pub use records::{ProfileRecord, RecordStore};
pub use state::{AppState, LoadReport, Phase, StoreEvent};

/// Backend keys owned by this crate.
pub mod keys {
    /// List of JSON-encoded profile records, newest first.
    pub const PROFILES: &str = "profiles";
    /// Theme mode label: `light`, `dark` or `system`.
    pub const THEME_MODE: &str = "theme_mode";
    /// Font scale multiplier, stored as a double.
    pub const FONT_SCALE: &str = "font_scale";
    /// UI language code, stored as text.
    pub const LANGUAGE: &str = "language";
}
