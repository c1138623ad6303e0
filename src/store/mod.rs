#[cfg(test)]
mod tests;

use log::{ info, warn };
use serde::{ Deserialize, Serialize };
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
#[cfg(test)]
use std::sync::Mutex;

use crate::error::ChatError;

/// The single persisted entry: the logged-in display name.
pub trait NameStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, ChatError>;
    fn save(&self, name: &str) -> Result<(), ChatError>;
    fn clear(&self) -> Result<(), ChatError>;
}

#[derive(Serialize, Deserialize)]
struct StoredName {
    #[serde(rename = "userName")]
    user_name: String,
}

pub struct FileNameStore {
    path: PathBuf,
}

impl FileNameStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl NameStore for FileNameStore {
    fn load(&self) -> Result<Option<String>, ChatError> {
        let json_str = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<StoredName>(&json_str) {
            Ok(stored) if !stored.user_name.is_empty() => Ok(Some(stored.user_name)),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!("Ignoring unreadable name store {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, name: &str) -> Result<(), ChatError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(&StoredName { user_name: name.to_string() })
            .map_err(|e| ChatError::Encoding(e.to_string()))?;
        fs::write(&self.path, json)?;
        info!("Saved display name to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), ChatError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryNameStore {
    name: Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryNameStore {
    pub fn with_name(name: &str) -> Self {
        Self { name: Mutex::new(Some(name.to_string())) }
    }
}

#[cfg(test)]
impl NameStore for MemoryNameStore {
    fn load(&self) -> Result<Option<String>, ChatError> {
        Ok(self.name.lock().unwrap().clone())
    }

    fn save(&self, name: &str) -> Result<(), ChatError> {
        *self.name.lock().unwrap() = Some(name.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ChatError> {
        *self.name.lock().unwrap() = None;
        Ok(())
    }
}
