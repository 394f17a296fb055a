//! External processes: the user's editor and the wrapped `opencode` binary.

use std::env;
use std::path::Path;
use std::process::Command;

use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::registry;
use crate::storage::Storage;

#[cfg(windows)]
const FALLBACK_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const FALLBACK_EDITOR: &str = "vi";

/// Editor command from `EDITOR`, then `VISUAL`, then a platform default.
pub fn resolve_editor() -> String {
    editor_from(env::var("EDITOR").ok(), env::var("VISUAL").ok())
}

fn editor_from(editor: Option<String>, visual: Option<String>) -> String {
    [editor, visual]
        .into_iter()
        .flatten()
        .find(|e| !e.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Open `path` in `editor` and wait for it to exit.
///
/// `editor` may carry its own arguments, e.g. `code -w`.
pub fn edit_file(editor: &str, path: &Path) -> Result<()> {
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(FALLBACK_EDITOR);

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|source| Error::EditorLaunch {
            editor: editor.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::EditorExit {
            editor: editor.to_string(),
            code: status.code(),
        })
    }
}

/// Temporarily replaces the active OpenCode config.
///
/// The original content is put back when the guard is dropped; if there was
/// no config before, the temporary one is removed.
#[derive(Debug)]
pub struct ConfigOverride<'a> {
    storage: &'a Storage,
    original: Option<Vec<u8>>,
}

impl<'a> ConfigOverride<'a> {
    pub fn install(storage: &'a Storage, content: &[u8]) -> Result<Self> {
        let original = storage.read_external_config()?;
        let guard = Self { storage, original };
        guard.storage.write_external_config(content)?;
        Ok(guard)
    }

    fn restore(&self) -> Result<()> {
        match &self.original {
            Some(content) => self.storage.write_external_config(content),
            None => self.storage.remove_external_config(),
        }
    }
}

impl Drop for ConfigOverride<'_> {
    fn drop(&mut self) {
        match self.restore() {
            Ok(()) => debug!("restored original OpenCode config"),
            Err(e) => error!(error = %e, "failed to restore original OpenCode config"),
        }
    }
}

/// Run opencode with a profile's config in place, then restore the original.
///
/// Returns the exit code to forward; a child killed by a signal maps to 1.
pub fn run_with_profile(storage: &Storage, name: &str, args: &[String]) -> Result<i32> {
    let paths = storage.paths();
    registry::require(paths, name)?;
    let content = storage.read_profile(name)?;
    let program = paths.opencode_bin();

    let status = {
        let _guard = ConfigOverride::install(storage, &content)?;
        info!(profile = name, program, ?args, "launching");
        Command::new(program)
            .args(args)
            .status()
            .map_err(|source| Error::Spawn {
                program: program.to_string(),
                source,
            })?
    };

    debug!(%status, "opencode exited");
    Ok(status.code().unwrap_or(1))
}
