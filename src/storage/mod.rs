pub mod database;
pub mod pinned;

pub use database::SqliteSettings;
pub use pinned::{load_pinned_clips, read_pinned_clips, save_pinned_clips};

use anyhow::Result;

pub const PINNED_CLIPS_KEY: &str = "clipdeck.pinnedClips";
pub const TRIM_SPACES_KEY: &str = "clipdeck.trimSpaces";

/// Durable key-value slots. Each key holds one value; `set` replaces it.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Missing, unreadable or non-boolean values read as `false`.
    fn get_bool(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(value)) if value == "true")
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "true" } else { "false" })
    }
}

#[cfg(test)]
pub mod memory {
    use super::SettingsStore;
    use anyhow::{Result, anyhow};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Inner {
        values: HashMap<String, String>,
        writes: Vec<(String, String)>,
        fail_writes: bool,
    }

    /// In-memory settings that record every write.
    #[derive(Clone, Default)]
    pub struct MemorySettings {
        inner: Arc<Mutex<Inner>>,
    }

    impl MemorySettings {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_value(key: &str, value: &str) -> Self {
            let settings = Self::new();
            settings
                .inner
                .lock()
                .unwrap()
                .values
                .insert(key.to_string(), value.to_string());
            settings
        }

        /// Replaces a value the way another process would, without
        /// recording it as one of this store's writes.
        pub fn store_external(&self, key: &str, value: &str) {
            self.inner
                .lock()
                .unwrap()
                .values
                .insert(key.to_string(), value.to_string());
        }

        pub fn writes_to(&self, key: &str) -> Vec<String> {
            self.inner
                .lock()
                .unwrap()
                .writes
                .iter()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .collect()
        }

        pub fn fail_writes(&self, fail: bool) {
            self.inner.lock().unwrap().fail_writes = fail;
        }
    }

    impl SettingsStore for MemorySettings {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.inner.lock().unwrap().values.get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            let mut inner = self.inner.lock().unwrap();
            if inner.fail_writes {
                return Err(anyhow!("settings store is read-only"));
            }
            inner.values.insert(key.to_string(), value.to_string());
            inner.writes.push((key.to_string(), value.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemorySettings;
    use super::*;

    #[test]
    fn test_get_bool_defaults_to_false() {
        let settings = MemorySettings::new();
        assert!(!settings.get_bool(TRIM_SPACES_KEY));
    }

    #[test]
    fn test_set_bool_round_trip() {
        let settings = MemorySettings::new();
        settings.set_bool(TRIM_SPACES_KEY, true).unwrap();
        assert!(settings.get_bool(TRIM_SPACES_KEY));
        assert_eq!(settings.get(TRIM_SPACES_KEY).unwrap().as_deref(), Some("true"));

        settings.set_bool(TRIM_SPACES_KEY, false).unwrap();
        assert!(!settings.get_bool(TRIM_SPACES_KEY));
    }

    #[test]
    fn test_get_bool_ignores_garbage() {
        let settings = MemorySettings::with_value(TRIM_SPACES_KEY, "yes please");
        assert!(!settings.get_bool(TRIM_SPACES_KEY));
    }
}
