use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage medium underneath [`FilesystemConfigManager`](super::FilesystemConfigManager).
pub trait Filesystem: Send + Sync {
    fn file_exists(&self, path: &Path) -> bool;
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}

#[derive(Clone, Copy, Default, Debug)]
pub struct OsFilesystem;

impl OsFilesystem {
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

impl Filesystem for OsFilesystem {
    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    // Rename over the target so a failed write never truncates it.
    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = Self::temp_path(path);
        fs::write(&temp, data)?;
        if let Err(e) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        Ok(())
    }
}

/// In-memory filesystem for ephemeral settings and tests. Writes can be made
/// to fail with [`MemoryFilesystem::set_write_error`].
#[derive(Default, Debug)]
pub struct MemoryFilesystem {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    write_err: Mutex<Option<String>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_write_error(&self, error: Option<String>) {
        if let Ok(mut guard) = self.write_err.lock() {
            *guard = error;
        }
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(path).cloned()
    }
}

fn poisoned() -> io::Error {
    io::Error::other("memory filesystem lock poisoned")
}

impl Filesystem for MemoryFilesystem {
    fn file_exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        let files = self.files.lock().map_err(|_| poisoned())?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(msg) = self.write_err.lock().map_err(|_| poisoned())?.clone() {
            return Err(io::Error::other(msg));
        }
        let mut files = self.files.lock().map_err(|_| poisoned())?;
        files.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }
}
