//! App-wide preferences: theme mode, font scale and UI language.
//!
//! Each preference lives under its own backend key and is written the moment
//! it changes. Loading never fails: a key that is missing or cannot be parsed
//! takes its default and the others load normally.

use std::fmt;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::keys;
use crate::storage::Storage;

/// Light, dark, or follow the platform setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    /// The label stored in the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseThemeModeError(String);

impl fmt::Display for ParseThemeModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown theme mode '{}'", self.0)
    }
}

impl std::error::Error for ParseThemeModeError {}

impl FromStr for ThemeMode {
    type Err = ParseThemeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            other => Err(ParseThemeModeError(other.to_string())),
        }
    }
}

/// How a preference type is encoded under its backend key.
pub trait PreferenceValue: Sized {
    /// `Ok(None)` when the key is absent.
    fn read(storage: &dyn Storage, key: &str) -> io::Result<Option<Self>>;

    fn write(&self, storage: &dyn Storage, key: &str) -> io::Result<()>;
}

impl PreferenceValue for ThemeMode {
    fn read(storage: &dyn Storage, key: &str) -> io::Result<Option<Self>> {
        match storage.get_string(key)? {
            None => Ok(None),
            Some(label) => label
                .parse()
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }

    fn write(&self, storage: &dyn Storage, key: &str) -> io::Result<()> {
        storage.set_string(key, self.as_str())
    }
}

impl PreferenceValue for f64 {
    fn read(storage: &dyn Storage, key: &str) -> io::Result<Option<Self>> {
        storage.get_double(key)
    }

    fn write(&self, storage: &dyn Storage, key: &str) -> io::Result<()> {
        storage.set_double(key, *self)
    }
}

impl PreferenceValue for String {
    fn read(storage: &dyn Storage, key: &str) -> io::Result<Option<Self>> {
        storage.get_string(key)
    }

    fn write(&self, storage: &dyn Storage, key: &str) -> io::Result<()> {
        storage.set_string(key, self)
    }
}

/// In-memory preferences bound to a backend.
#[derive(Debug)]
pub struct PreferenceStore {
    storage: Arc<dyn Storage>,
    values: PreferenceSet,
}

impl PreferenceStore {
    /// Starts with defaults; call `load` to read the backend.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            values: PreferenceSet::default(),
        }
    }

    pub fn values(&self) -> &PreferenceSet {
        &self.values
    }
}

/// Declares the preference fields once and generates `PreferenceSet`, its
/// defaults, `PreferenceStore::load` and a getter/setter pair per field.
macro_rules! preference_fields {
    (
        $(
            $(#[$inner:meta])*
            $field:ident: $type:ty = $default:expr => $key:expr,
        )*
    ) => {
        paste::paste! {
            /// Snapshot of every app-wide preference.
            #[derive(Debug, Clone, PartialEq)]
            pub struct PreferenceSet {
                $(
                    $(#[$inner])*
                    pub $field: $type,
                )*
            }

            impl Default for PreferenceSet {
                fn default() -> Self {
                    PreferenceSet {
                        $(
                            $field: $default,
                        )*
                    }
                }
            }

            impl PreferenceStore {
                /// Reads every preference key into the store. Keys that are missing
                /// or unreadable take their default.
                ///
                /// Returns the names of the defaulted keys, not the values; read
                /// those through `values()` or the getters.
                pub fn load(&mut self) -> Vec<&'static str> {
                    let mut defaulted = Vec::new();
                    $(
                        self.values.$field = match <$type as PreferenceValue>::read(self.storage.as_ref(), $key) {
                            Ok(Some(value)) => value,
                            Ok(None) => {
                                defaulted.push($key);
                                $default
                            }
                            Err(e) => {
                                tracing::warn!("Preference '{}' is unreadable, using default: {}", $key, e);
                                defaulted.push($key);
                                $default
                            }
                        };
                    )*
                    defaulted
                }

                $(
                    /// Returns a reference to the field value.
                    pub fn [<get_ $field>](&self) -> &$type {
                        &self.values.$field
                    }

                    /// Updates the field value and writes its key before returning.
                    pub fn [<set_ $field>](&mut self, value: $type) -> Result<(), PersistError> {
                        self.values.$field = value;
                        PreferenceValue::write(&self.values.$field, self.storage.as_ref(), $key)
                            .map_err(|e| {
                                tracing::warn!("Failed to persist preference '{}': {}", $key, e);
                                PersistError::new($key, e)
                            })
                    }
                )*
            }
        }
    };
}

preference_fields! {
    /// Light, dark, or follow the platform.
    theme_mode: ThemeMode = ThemeMode::System => keys::THEME_MODE,
    /// Text size multiplier. Expected in 0.8..=1.4 but never clamped.
    font_scale: f64 = 1.0 => keys::FONT_SCALE,
    /// UI language code, stored as given.
    language: String = "ID".to_string() => keys::LANGUAGE,
}
