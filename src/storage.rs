//! JSON-backed persistence for profiles, their metadata and the launcher state.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Paths;
use crate::error::{Error, Result};

/// Which profile is mirrored into the OpenCode config, and when that last changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherState {
    #[serde(default)]
    pub current_profile: Option<String>,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

/// Sidecar metadata stored next to each profile as `<name>.meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMeta {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProfileMeta {
    pub fn new(name: &str, description: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            created_at: now(),
            description,
        }
    }
}

/// Current time at millisecond precision, matching the timestamps written to disk.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Read and write access to the launcher's directory tree.
#[derive(Debug, Clone)]
pub struct Storage {
    paths: Paths,
}

impl Storage {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Create the launcher root and profiles directory if they are missing.
    pub fn ensure_directories(&self) -> Result<()> {
        let dir = self.paths.profiles_dir();
        fs::create_dir_all(&dir).map_err(|e| Error::io("creating directory", &dir, e))
    }

    /// Load the launcher state; a missing or corrupted file yields the default.
    pub fn read_state(&self) -> LauncherState {
        read_lenient(&self.paths.state_path()).unwrap_or_default()
    }

    pub fn write_state(&self, state: &LauncherState) -> Result<()> {
        let path = self.paths.state_path();
        write_json(&path, state)?;
        debug!(current = ?state.current_profile, "wrote launcher state");
        Ok(())
    }

    /// Load a profile's metadata; a missing or corrupted sidecar yields `None`.
    pub fn read_profile_meta(&self, name: &str) -> Option<ProfileMeta> {
        read_lenient(&self.paths.meta_path(name))
    }

    pub fn write_profile_meta(&self, name: &str, meta: &ProfileMeta) -> Result<()> {
        write_json(&self.paths.meta_path(name), meta)
    }

    /// Raw content of a profile file.
    pub fn read_profile(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.paths.profile_path(name);
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ProfileNotFound(name.to_string()),
            _ => Error::io("reading profile", &path, e),
        })
    }

    pub fn write_profile(&self, name: &str, content: &[u8]) -> Result<()> {
        let path = self.paths.profile_path(name);
        fs::write(&path, content).map_err(|e| Error::io("writing profile", &path, e))?;
        debug!(profile = name, path = %path.display(), "wrote profile");
        Ok(())
    }

    /// Remove a profile file and, if present, its metadata sidecar.
    pub fn delete_profile(&self, name: &str) -> Result<()> {
        let path = self.paths.profile_path(name);
        fs::remove_file(&path).map_err(|e| Error::io("removing profile", &path, e))?;

        let meta = self.paths.meta_path(name);
        match fs::remove_file(&meta) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io("removing metadata", &meta, e)),
        }
        debug!(profile = name, "deleted profile");
        Ok(())
    }

    /// Duplicate a profile's content under a new name.
    pub fn copy_profile(&self, src: &str, dest: &str) -> Result<()> {
        let from = self.paths.profile_path(src);
        let to = self.paths.profile_path(dest);
        fs::copy(&from, &to).map_err(|e| Error::io("copying profile", &from, e))?;
        debug!(src, dest, "copied profile");
        Ok(())
    }

    /// Move a profile file and its metadata sidecar to a new name.
    pub fn rename_profile(&self, old: &str, new: &str) -> Result<()> {
        let from = self.paths.profile_path(old);
        let to = self.paths.profile_path(new);
        fs::rename(&from, &to).map_err(|e| Error::io("renaming profile", &from, e))?;

        let meta_from = self.paths.meta_path(old);
        let meta_to = self.paths.meta_path(new);
        match fs::rename(&meta_from, &meta_to) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io("renaming metadata", &meta_from, e)),
        }
        debug!(old, new, "renamed profile");
        Ok(())
    }

    /// Content of the active OpenCode config, or `None` if it does not exist.
    pub fn read_external_config(&self) -> Result<Option<Vec<u8>>> {
        let path = self.paths.external_config();
        match fs::read(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io("reading", path, e)),
        }
    }

    pub fn write_external_config(&self, content: &[u8]) -> Result<()> {
        let path = self.paths.external_config();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io("creating settings parent dir", parent, e))?;
        }
        fs::write(path, content).map_err(|e| Error::io("writing", path, e))?;
        debug!(path = %path.display(), "wrote OpenCode config");
        Ok(())
    }

    pub fn remove_external_config(&self) -> Result<()> {
        let path = self.paths.external_config();
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io("removing", path, e)),
        }
    }
}

fn read_lenient<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "ignoring unreadable file");
            }
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed JSON");
            None
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| Error::io("writing", path, e))
}
