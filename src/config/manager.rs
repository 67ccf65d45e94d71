use crate::config::fs::{Filesystem, OsFilesystem};
use crate::config::types::Settings;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config directory not found")]
    ConfigDirNotFound,
    #[error("Settings lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Read-modify-write step applied by [`ConfigManager::save_with`].
pub type Transform<'a> = Box<dyn FnOnce(Settings) -> Settings + Send + 'a>;

/// Durable settings store.
///
/// `save_with` is the only way to change the stored settings. Implementations
/// must serialize concurrent `save_with` calls so that the read and write
/// halves of two transforms never interleave, and must leave the stored
/// settings untouched when the write fails.
pub trait ConfigManager: Send + Sync {
    fn load(&self) -> Result<Settings>;

    /// Applies `transform` to the current settings, stores the result and
    /// returns what was stored.
    fn save_with(&self, transform: Transform<'_>) -> Result<Settings>;
}

pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .or_else(dirs::data_local_dir)
        .ok_or(ConfigError::ConfigDirNotFound)?;

    let app_config_dir = config_dir.join("vpnctl");
    Ok(app_config_dir.join("settings.jsonc"))
}

/// Settings kept as a JSON file. Comments are accepted when reading but are
/// not preserved on write.
pub struct FilesystemConfigManager {
    location: PathBuf,
    fs: Arc<dyn Filesystem>,
    lock: Mutex<()>,
}

impl FilesystemConfigManager {
    pub fn new(location: impl Into<PathBuf>, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            location: location.into(),
            fs,
            lock: Mutex::new(()),
        }
    }

    /// Store at the per-user default location on the real filesystem.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(get_config_path()?, Arc::new(OsFilesystem)))
    }

    pub fn location(&self) -> &PathBuf {
        &self.location
    }

    fn read(&self) -> Result<Settings> {
        if !self.fs.file_exists(&self.location) {
            return Ok(Settings::new());
        }

        let content = self.fs.read_file(&self.location)?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Settings::new());
        }
        let stripped = json_comments::StripComments::new(content.as_slice());
        let settings: Settings = serde_json::from_reader(stripped)?;

        Ok(settings)
    }
}

impl ConfigManager for FilesystemConfigManager {
    fn load(&self) -> Result<Settings> {
        let _guard = self.lock.lock().map_err(|_| ConfigError::Poisoned)?;
        self.read()
    }

    fn save_with(&self, transform: Transform<'_>) -> Result<Settings> {
        let _guard = self.lock.lock().map_err(|_| ConfigError::Poisoned)?;
        let settings = transform(self.read()?);
        let json = serde_json::to_vec_pretty(&settings)?;
        self.fs.write_file(&self.location, &json)?;
        tracing::debug!(location = %self.location.display(), "settings saved");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fs::MemoryFilesystem;
    use std::thread;

    fn memory_manager() -> (Arc<MemoryFilesystem>, FilesystemConfigManager) {
        let fs = Arc::new(MemoryFilesystem::new());
        let cm = FilesystemConfigManager::new("/location/settings.jsonc", fs.clone());
        (fs, cm)
    }

    #[test]
    fn test_config_path() {
        let path = get_config_path();
        assert!(path.is_ok());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("vpnctl"));
        assert!(path.to_string_lossy().ends_with("settings.jsonc"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let (_, cm) = memory_manager();
        assert_eq!(cm.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_load_with_comments() {
        let fs = Arc::new(MemoryFilesystem::new());
        fs.write_file(
            std::path::Path::new("/s.jsonc"),
            br#"{
                // custom resolvers
                "auto_connect_data": { "dns": ["1.1.1.1"] },
                "ipv6": true /* dual stack */
            }"#,
        )
        .unwrap();
        let cm = FilesystemConfigManager::new("/s.jsonc", fs);

        let settings = cm.load().unwrap();
        assert_eq!(settings.auto_connect_data.dns, vec!["1.1.1.1".to_string()]);
        assert!(settings.ipv6);
    }

    #[test]
    fn test_save_with_returns_and_persists_result() {
        let (_, cm) = memory_manager();
        let saved = cm
            .save_with(Box::new(|mut s: Settings| {
                s.kill_switch = true;
                s
            }))
            .unwrap();
        assert!(saved.kill_switch);
        assert_eq!(cm.load().unwrap(), saved);
    }

    #[test]
    fn test_failed_write_leaves_settings_untouched() {
        let (fs, cm) = memory_manager();
        cm.save_with(Box::new(|mut s: Settings| {
            s.ipv6 = true;
            s
        }))
        .unwrap();

        fs.set_write_error(Some("failed to save config".to_string()));
        let result = cm.save_with(Box::new(|mut s: Settings| {
            s.ipv6 = false;
            s
        }));
        assert!(matches!(result, Err(ConfigError::Io(_))));
        assert!(cm.load().unwrap().ipv6);
    }

    #[test]
    fn test_concurrent_transforms_do_not_lose_updates() {
        let (_, cm) = memory_manager();
        let cm = Arc::new(cm);

        let handles: Vec<_> = (1..=20u16)
            .map(|port| {
                let cm = cm.clone();
                thread::spawn(move || {
                    cm.save_with(Box::new(move |mut s: Settings| {
                        s.allowlist.ports.tcp.insert(port);
                        s
                    }))
                    .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cm.load().unwrap().allowlist.ports.tcp.len(), 20);
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cm = FilesystemConfigManager::new(dir.path().join("settings.jsonc"), Arc::new(OsFilesystem));
        cm.save_with(Box::new(|mut s: Settings| {
            s.auto_connect_data.threat_protection_lite = true;
            s
        }))
        .unwrap();

        let reopened =
            FilesystemConfigManager::new(dir.path().join("settings.jsonc"), Arc::new(OsFilesystem));
        assert!(reopened.load().unwrap().auto_connect_data.threat_protection_lite);
    }
}
