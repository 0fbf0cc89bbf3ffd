use profile_store::keys;
use profile_store::storage::memory::MemoryStorage;
use profile_store::storage::Storage;
use profile_store::{
    AppState, LoadError, PersistError, ProfileRecord, StoreError, StoreEvent, ThemeMode,
};
use std::error::Error;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Memory-backed storage whose writes can be switched to fail.
#[derive(Debug, Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStorage {
    fn check(&self) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        } else {
            Ok(())
        }
    }
}

impl Storage for FlakyStorage {
    fn get_string(&self, key: &str) -> io::Result<Option<String>> {
        self.inner.get_string(key)
    }

    fn set_string(&self, key: &str, value: &str) -> io::Result<()> {
        self.check()?;
        self.inner.set_string(key, value)
    }

    fn get_double(&self, key: &str) -> io::Result<Option<f64>> {
        self.inner.get_double(key)
    }

    fn set_double(&self, key: &str, value: f64) -> io::Result<()> {
        self.check()?;
        self.inner.set_double(key, value)
    }

    fn get_string_list(&self, key: &str) -> io::Result<Option<Vec<String>>> {
        self.inner.get_string_list(key)
    }

    fn set_string_list(&self, key: &str, value: &[String]) -> io::Result<()> {
        self.check()?;
        self.inner.set_string_list(key, value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.check()?;
        self.inner.remove(key)
    }

    fn get_path(&self, key: &str) -> String {
        format!("flaky::{}", key)
    }
}

/// Storage whose reads always fail.
#[derive(Debug)]
struct UnreadableStorage;

impl Storage for UnreadableStorage {
    fn get_string(&self, _key: &str) -> io::Result<Option<String>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }

    fn set_string(&self, _key: &str, _value: &str) -> io::Result<()> {
        Ok(())
    }

    fn get_double(&self, _key: &str) -> io::Result<Option<f64>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }

    fn set_double(&self, _key: &str, _value: f64) -> io::Result<()> {
        Ok(())
    }

    fn get_string_list(&self, _key: &str) -> io::Result<Option<Vec<String>>> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }

    fn set_string_list(&self, _key: &str, _value: &[String]) -> io::Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> io::Result<()> {
        Ok(())
    }

    fn get_path(&self, key: &str) -> String {
        format!("unreadable::{}", key)
    }
}

fn ready_flaky_state() -> (AppState, Arc<AtomicBool>) {
    let storage = FlakyStorage::default();
    let fail_writes = Arc::clone(&storage.fail_writes);
    let mut state = AppState::new(Box::new(storage));
    state.load();
    state.drain_events();
    (state, fail_writes)
}

#[test]
fn test_failed_preference_write_is_reported() {
    let (mut state, fail_writes) = ready_flaky_state();
    fail_writes.store(true, Ordering::SeqCst);

    match state.set_theme_mode(ThemeMode::Dark) {
        Err(StoreError::Persist(PersistError { key, .. })) => assert_eq!(key, keys::THEME_MODE),
        other => panic!("Expected Persist error, got {:?}", other),
    }

    // the in-memory value still changed and observers still hear about it
    assert_eq!(state.preferences().unwrap().theme_mode, ThemeMode::Dark);
    let events = state.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], StoreEvent::PreferencesChanged(p) if p.theme_mode == ThemeMode::Dark));
}

#[test]
fn test_failed_record_writes_are_reported() {
    let (mut state, fail_writes) = ready_flaky_state();
    state.insert_front(ProfileRecord::new("Ana", "CS", "2023", "a@x.com", "08123")).unwrap();
    fail_writes.store(true, Ordering::SeqCst);

    let err = state
        .insert_front(ProfileRecord::new("Budi", "EE", "2022", "b@x.com", "08456"))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persist(ref e) if e.key == keys::PROFILES));

    assert!(matches!(state.delete_at(0), Err(StoreError::Persist(_))));
    assert!(matches!(state.clear_all(), Err(StoreError::Persist(_))));

    fail_writes.store(false, Ordering::SeqCst);
    state.insert_front(ProfileRecord::default()).expect("Writes recover once the backend does");
}

#[test]
fn test_unreadable_backend_still_loads_defaults() {
    let mut state = AppState::new(Box::new(UnreadableStorage));
    let report = state.load();

    assert!(state.is_ready());
    assert_eq!(state.preferences().unwrap().theme_mode, ThemeMode::System);
    assert!(state.records().unwrap().is_empty());
    assert_eq!(report.defaulted_keys.len(), 3);
}

#[test]
fn test_persist_error_display_and_source() {
    let error = PersistError {
        key: keys::FONT_SCALE,
        source: io::Error::new(io::ErrorKind::Other, "disk full"),
    };
    let display = format!("{}", error);
    assert!(display.contains("font_scale"));
    assert!(display.contains("disk full"));
    assert!(error.source().is_some());

    let wrapped = StoreError::from(error);
    assert!(format!("{}", wrapped).contains("disk full"));
    assert!(wrapped.source().is_some());
}

#[test]
fn test_not_ready_display() {
    let display = format!("{}", StoreError::NotReady);
    assert!(display.contains("not ready"));
    assert!(StoreError::NotReady.source().is_none());
}

#[test]
fn test_storage_error_display() {
    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "test error");
    let storage_error = LoadError::StorageError(io_error);
    let display = format!("{}", storage_error);
    assert!(display.contains("storage error"));
    assert!(display.contains("test error"));
}

#[test]
fn test_error_trait_implementation() {
    let error = LoadError::InstanceAlreadyLoaded;
    // Verify it implements std::error::Error
    let _: &dyn std::error::Error = &error;
    let _: &dyn std::error::Error = &StoreError::NotReady;
}
