//! Error types for ocm.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using ocm's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ocm.
#[derive(Error, Debug)]
pub enum Error {
    /// Profile name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid profile name '{0}': use only letters, digits, '-' and '_'")]
    InvalidName(String),

    #[error("profile '{0}' already exists")]
    ProfileExists(String),

    #[error("profile '{0}' does not exist")]
    ProfileNotFound(String),

    /// Refused to delete the active profile without `--force`.
    #[error("profile '{0}' is currently active")]
    ActiveProfile(String),

    #[error("profile '{name}' is not valid JSON: {source}")]
    ProfileParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to launch editor '{editor}': {source}")]
    EditorLaunch {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("editor '{editor}' exited with error code: {code:?}")]
    EditorExit { editor: String, code: Option<i32> },

    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not determine the user configuration directory")]
    NoConfigDir,

    /// IO error with the path it happened on.
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Suggested command that resolves the error, if there is one.
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::InvalidName(_) => Some("choose a name like 'work' or 'side_project-2'".into()),
            Self::ProfileExists(name) => Some(format!(
                "pick another name, or remove it first: ocm delete {name}"
            )),
            Self::ProfileNotFound(_) => Some("see available profiles: ocm list".into()),
            Self::ActiveProfile(name) => Some(format!(
                "switch to another profile first (ocm use <name>) or run: ocm delete {name} --force"
            )),
            Self::ProfileParse { name, .. } => Some(format!("fix the file with: ocm edit {name}")),
            Self::EditorLaunch { .. } => Some("set EDITOR to an installed editor".into()),
            Self::Spawn { .. } => {
                Some("make sure 'opencode' is on PATH or set OCM_OPENCODE_BIN".into())
            }
            Self::NoConfigDir => Some("set OCM_CONFIG_DIR and OCM_OPENCODE_CONFIG".into()),
            _ => None,
        }
    }
}
