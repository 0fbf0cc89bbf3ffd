use std::fmt::Debug;
use std::io;

use crate::error::LoadError;

/// Name of the document [`native::FileStorage`] keeps inside its directory.
pub const STORE_FILENAME: &str = "profile-store.toml";

/// String-keyed persistence backend.
///
/// Every method returns once the backend has settled the operation. A key
/// holding a value of another type reads as [`io::ErrorKind::InvalidData`].
pub trait Storage: Send + Sync + Debug {
    fn get_string(&self, key: &str) -> io::Result<Option<String>>;

    fn set_string(&self, key: &str, value: &str) -> io::Result<()>;

    fn get_double(&self, key: &str) -> io::Result<Option<f64>>;

    fn set_double(&self, key: &str, value: f64) -> io::Result<()>;

    fn get_string_list(&self, key: &str) -> io::Result<Option<Vec<String>>>;

    fn set_string_list(&self, key: &str, value: &[String]) -> io::Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> io::Result<()>;

    /// Get the full path/key for display purposes
    fn get_path(&self, key: &str) -> String;
}

fn wrong_type(key: &str, expected: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("value stored under '{}' is not a {}", key, expected),
    )
}

/// Typed access to a TOML table, shared by the file and memory backends.
mod table {
    use super::wrong_type;
    use std::io;
    use toml::{Table, Value};

    pub(super) fn get_string(table: &Table, key: &str) -> io::Result<Option<String>> {
        match table.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key, "string")),
        }
    }

    pub(super) fn get_double(table: &Table, key: &str) -> io::Result<Option<f64>> {
        match table.get(key) {
            None => Ok(None),
            Some(Value::Float(f)) => Ok(Some(*f)),
            // whole numbers written by hand lose their decimal point
            Some(Value::Integer(i)) => Ok(Some(*i as f64)),
            Some(_) => Err(wrong_type(key, "number")),
        }
    }

    pub(super) fn get_string_list(table: &Table, key: &str) -> io::Result<Option<Vec<String>>> {
        match table.get(key) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(wrong_type(key, "list of strings")),
                })
                .collect::<io::Result<Vec<_>>>()
                .map(Some),
            Some(_) => Err(wrong_type(key, "list of strings")),
        }
    }

    pub(super) fn set_string(table: &mut Table, key: &str, value: &str) {
        table.insert(key.to_string(), Value::String(value.to_string()));
    }

    pub(super) fn set_double(table: &mut Table, key: &str, value: f64) {
        table.insert(key.to_string(), Value::Float(value));
    }

    pub(super) fn set_string_list(table: &mut Table, key: &str, value: &[String]) {
        let items = value.iter().cloned().map(Value::String).collect();
        table.insert(key.to_string(), Value::Array(items));
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::{table, Storage, STORE_FILENAME};
    use crate::error::LoadError;
    use once_cell::sync::Lazy;
    use std::collections::HashSet;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, PoisonError};
    use toml::Table;

    // Documents currently owned by an open FileStorage in this process.
    static OPEN_DOCUMENTS: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

    /// All keys live in one TOML document that is rewritten whole on every change.
    #[derive(Debug)]
    pub struct FileStorage {
        base_dir: PathBuf,
        path: PathBuf,
        write_lock: Mutex<()>,
    }

    impl FileStorage {
        /// Opens the store document inside `directory`.
        ///
        /// Only one handle per document may be open in a process at a time, so
        /// the store stays the sole writer of its keys. The directory is created
        /// if needed and resolved to its canonical path, so `dir/sub/..` and a
        /// relative spelling of `dir` count as the same document.
        pub fn open(directory: impl AsRef<Path>) -> Result<Self, LoadError> {
            std::fs::create_dir_all(directory.as_ref())?;
            let base_dir = std::fs::canonicalize(directory.as_ref())?;
            let path = base_dir.join(STORE_FILENAME);

            let mut open = OPEN_DOCUMENTS.lock().unwrap_or_else(PoisonError::into_inner);
            if !open.insert(path.clone()) {
                return Err(LoadError::InstanceAlreadyLoaded);
            }
            tracing::debug!("Opened profile store at {}", path.display());

            Ok(Self {
                base_dir,
                path,
                write_lock: Mutex::new(()),
            })
        }

        fn read_table(&self) -> io::Result<Table> {
            if !self.path.exists() {
                return Ok(Table::new());
            }
            let contents = std::fs::read_to_string(&self.path)?;
            contents
                .parse::<Table>()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        }

        fn write_table(&self, table: &Table) -> io::Result<()> {
            // Ensure parent directory exists
            std::fs::create_dir_all(&self.base_dir)?;

            let data = toml::to_string(table)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

            // Write to temporary file first
            let mut tmp_file = tempfile::NamedTempFile::new_in(&self.base_dir)?;
            tmp_file.write_all(data.as_bytes())?;

            // Atomically move temp file to final location
            tmp_file.persist(&self.path).map_err(|e| e.error)?;

            Ok(())
        }

        /// Where an unreadable document is copied before it is replaced.
        pub fn corrupt_backup_path(&self) -> PathBuf {
            self.base_dir.join(format!("{}.corrupt", STORE_FILENAME))
        }

        /// Read-modify-write of the whole document. `apply` returns false when
        /// nothing changed and the write can be skipped.
        fn update(&self, apply: impl FnOnce(&mut Table) -> bool) -> io::Result<()> {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut table = match self.read_table() {
                Ok(table) => table,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    let backup = self.corrupt_backup_path();
                    std::fs::copy(&self.path, &backup)?;
                    tracing::warn!(
                        "Replacing unreadable store document {} (copy kept at {}): {}",
                        self.path.display(),
                        backup.display(),
                        e
                    );
                    Table::new()
                }
                Err(e) => return Err(e),
            };
            if apply(&mut table) {
                self.write_table(&table)?;
            }
            Ok(())
        }
    }

    impl Drop for FileStorage {
        fn drop(&mut self) {
            OPEN_DOCUMENTS
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.path);
        }
    }

    impl Storage for FileStorage {
        fn get_string(&self, key: &str) -> io::Result<Option<String>> {
            table::get_string(&self.read_table()?, key)
        }

        fn set_string(&self, key: &str, value: &str) -> io::Result<()> {
            self.update(|t| {
                table::set_string(t, key, value);
                true
            })
        }

        fn get_double(&self, key: &str) -> io::Result<Option<f64>> {
            table::get_double(&self.read_table()?, key)
        }

        fn set_double(&self, key: &str, value: f64) -> io::Result<()> {
            self.update(|t| {
                table::set_double(t, key, value);
                true
            })
        }

        fn get_string_list(&self, key: &str) -> io::Result<Option<Vec<String>>> {
            table::get_string_list(&self.read_table()?, key)
        }

        fn set_string_list(&self, key: &str, value: &[String]) -> io::Result<()> {
            self.update(|t| {
                table::set_string_list(t, key, value);
                true
            })
        }

        fn remove(&self, key: &str) -> io::Result<()> {
            self.update(|t| t.remove(key).is_some())
        }

        fn get_path(&self, key: &str) -> String {
            format!("{}#{}", self.path.display(), key)
        }
    }
}

pub mod memory {
    use super::{table, Storage};
    use std::io;
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use toml::Table;

    /// Keeps every key in process memory. Nothing survives a restart.
    #[derive(Debug, Default)]
    pub struct MemoryStorage {
        table: Mutex<Table>,
    }

    impl MemoryStorage {
        pub fn new() -> Self {
            Self::default()
        }

        fn table(&self) -> MutexGuard<'_, Table> {
            self.table.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Storage for MemoryStorage {
        fn get_string(&self, key: &str) -> io::Result<Option<String>> {
            table::get_string(&self.table(), key)
        }

        fn set_string(&self, key: &str, value: &str) -> io::Result<()> {
            table::set_string(&mut self.table(), key, value);
            Ok(())
        }

        fn get_double(&self, key: &str) -> io::Result<Option<f64>> {
            table::get_double(&self.table(), key)
        }

        fn set_double(&self, key: &str, value: f64) -> io::Result<()> {
            table::set_double(&mut self.table(), key, value);
            Ok(())
        }

        fn get_string_list(&self, key: &str) -> io::Result<Option<Vec<String>>> {
            table::get_string_list(&self.table(), key)
        }

        fn set_string_list(&self, key: &str, value: &[String]) -> io::Result<()> {
            table::set_string_list(&mut self.table(), key, value);
            Ok(())
        }

        fn remove(&self, key: &str) -> io::Result<()> {
            self.table().remove(key);
            Ok(())
        }

        fn get_path(&self, key: &str) -> String {
            format!("memory::{}", key)
        }
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm {
    use super::{wrong_type, Storage};
    use std::io;
    use web_sys::{window, Storage as WebStorage};

    /// Browser `localStorage`, one entry per key under an app-specific prefix.
    #[derive(Debug)]
    pub struct LocalStorage {
        prefix: String,
    }

    impl LocalStorage {
        pub fn new(app_id: &str) -> Self {
            Self {
                prefix: format!("profile_store_{}_", app_id.replace(['/', '.'], "_")),
            }
        }

        fn get_storage() -> io::Result<WebStorage> {
            window()
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "window not available"))?
                .local_storage()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "localStorage not available"))?
                .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "localStorage is null"))
        }

        fn full_key(&self, key: &str) -> String {
            format!("{}{}", self.prefix, key)
        }

        fn read(&self, key: &str) -> io::Result<Option<String>> {
            Self::get_storage()?
                .get_item(&self.full_key(key))
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "failed to read from localStorage"))
        }

        fn write(&self, key: &str, data: &str) -> io::Result<()> {
            Self::get_storage()?
                .set_item(&self.full_key(key), data)
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "failed to write to localStorage"))
        }
    }

    impl Storage for LocalStorage {
        fn get_string(&self, key: &str) -> io::Result<Option<String>> {
            self.read(key)
        }

        fn set_string(&self, key: &str, value: &str) -> io::Result<()> {
            self.write(key, value)
        }

        fn get_double(&self, key: &str) -> io::Result<Option<f64>> {
            match self.read(key)? {
                None => Ok(None),
                Some(text) => text
                    .trim()
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| wrong_type(key, "number")),
            }
        }

        fn set_double(&self, key: &str, value: f64) -> io::Result<()> {
            self.write(key, &value.to_string())
        }

        fn get_string_list(&self, key: &str) -> io::Result<Option<Vec<String>>> {
            match self.read(key)? {
                None => Ok(None),
                Some(text) => serde_json::from_str::<Vec<String>>(&text)
                    .map(Some)
                    .map_err(|_| wrong_type(key, "list of strings")),
            }
        }

        fn set_string_list(&self, key: &str, value: &[String]) -> io::Result<()> {
            let encoded = serde_json::to_string(value)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            self.write(key, &encoded)
        }

        fn remove(&self, key: &str) -> io::Result<()> {
            Self::get_storage()?
                .remove_item(&self.full_key(key))
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "failed to remove from localStorage"))
        }

        fn get_path(&self, key: &str) -> String {
            format!("localStorage::{}", self.full_key(key))
        }
    }
}

/// Platform-specific storage factory
#[cfg(not(target_arch = "wasm32"))]
pub fn create_storage(directory: &str) -> Result<Box<dyn Storage>, LoadError> {
    Ok(Box::new(native::FileStorage::open(directory)?))
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn create_storage(app_id: &str) -> Result<Box<dyn Storage>, LoadError> {
    Ok(Box::new(wasm::LocalStorage::new(app_id)))
}

/// Storage in the platform configuration directory for `namespace`
/// (e.g. `"com.example.App"`).
#[cfg(not(target_arch = "wasm32"))]
pub fn storage_for_namespace(namespace: &str) -> Result<Box<dyn Storage>, LoadError> {
    let project = directories::ProjectDirs::from("", "", namespace)
        .ok_or_else(|| LoadError::NoConfigDirectory(namespace.to_string()))?;
    Ok(Box::new(native::FileStorage::open(project.config_dir())?))
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub fn storage_for_namespace(namespace: &str) -> Result<Box<dyn Storage>, LoadError> {
    create_storage(namespace)
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStorage;
    use super::*;

    #[test]
    fn test_memory_storage_typed_values() {
        let storage = MemoryStorage::new();
        storage.set_string("language", "EN").unwrap();
        storage.set_double("font_scale", 1.2).unwrap();
        storage
            .set_string_list("profiles", &["a".to_string(), "b".to_string()])
            .unwrap();

        assert_eq!(storage.get_string("language").unwrap(), Some("EN".to_string()));
        assert_eq!(storage.get_double("font_scale").unwrap(), Some(1.2));
        assert_eq!(
            storage.get_string_list("profiles").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(storage.get_string("missing").unwrap(), None);
    }

    #[test]
    fn test_type_mismatch_is_invalid_data() {
        let storage = MemoryStorage::new();
        storage.set_string("font_scale", "large").unwrap();
        let err = storage.get_double("font_scale").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(storage.get_string_list("font_scale").is_err());
    }

    #[test]
    fn test_integer_reads_as_double() {
        let mut t = toml::Table::new();
        t.insert("font_scale".to_string(), toml::Value::Integer(1));
        assert_eq!(table::get_double(&t, "font_scale").unwrap(), Some(1.0));
    }

    #[test]
    fn test_remove_absent_key_succeeds() {
        let storage = MemoryStorage::new();
        storage.remove("profiles").unwrap();
        storage.set_string("language", "ID").unwrap();
        storage.remove("language").unwrap();
        assert_eq!(storage.get_string("language").unwrap(), None);
    }
}
