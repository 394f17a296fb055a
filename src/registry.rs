//! Profile name rules and enumeration of the profiles directory.

use std::fs;
use std::io::ErrorKind;

use crate::config::{Paths, profile_name_from_file};
use crate::error::{Error, Result};

/// Whether `name` is a usable profile name (`^[a-zA-Z0-9_-]+$`).
pub fn validate_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Like [`validate_name`], as a `Result` for use with `?`.
pub fn check_name(name: &str) -> Result<()> {
    if validate_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

/// Names of all profiles on disk, in directory order.
///
/// A missing profiles directory is an empty registry.
pub fn list_profiles(paths: &Paths) -> Result<Vec<String>> {
    let dir = paths.profiles_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io("reading profiles dir", &dir, e)),
    };

    let names = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| {
            e.file_name()
                .to_str()
                .and_then(profile_name_from_file)
                .map(str::to_string)
        })
        .collect();
    Ok(names)
}

/// Whether the profile's primary file exists; metadata is not required.
///
/// Names that could resolve outside the profiles directory never exist.
pub fn exists(paths: &Paths, name: &str) -> bool {
    validate_name(name) && paths.profile_path(name).is_file()
}

/// Fail unless `name` is valid and the profile exists.
pub fn require(paths: &Paths, name: &str) -> Result<()> {
    check_name(name)?;
    if exists(paths, name) {
        Ok(())
    } else {
        Err(Error::ProfileNotFound(name.to_string()))
    }
}
