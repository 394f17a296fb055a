use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const PROFILE_SUFFIX: &str = ".json";
const META_SUFFIX: &str = ".meta.json";

/// Resolved filesystem layout for one launcher invocation.
///
/// Every operation receives this value explicitly, so tests can point the
/// whole tool at a temporary directory.
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
    external_config: PathBuf,
    opencode_bin: String,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>, external_config: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            external_config: external_config.into(),
            opencode_bin: "opencode".to_string(),
        }
    }

    /// Resolve the layout from the environment.
    ///
    /// `OCM_CONFIG_DIR` overrides the launcher root, `OCM_OPENCODE_CONFIG` the
    /// active OpenCode config and `OCM_OPENCODE_BIN` the executable to launch.
    pub fn from_env() -> Result<Self> {
        let root = match env::var_os("OCM_CONFIG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir().ok_or(Error::NoConfigDir)?.join("ocm"),
        };
        let external_config = match env::var_os("OCM_OPENCODE_CONFIG") {
            Some(p) => PathBuf::from(p),
            None => dirs::home_dir()
                .ok_or(Error::NoConfigDir)?
                .join(".config")
                .join("opencode")
                .join("opencode.json"),
        };
        let mut paths = Self::new(root, external_config);
        if let Ok(bin) = env::var("OCM_OPENCODE_BIN")
            && !bin.trim().is_empty()
        {
            paths.opencode_bin = bin;
        }
        Ok(paths)
    }

    pub fn with_opencode_bin(mut self, bin: impl Into<String>) -> Self {
        self.opencode_bin = bin.into();
        self
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join("state.json")
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir().join(format!("{name}{PROFILE_SUFFIX}"))
    }

    pub fn meta_path(&self, name: &str) -> PathBuf {
        self.profiles_dir().join(format!("{name}{META_SUFFIX}"))
    }

    /// The OpenCode config file that switching overwrites.
    pub fn external_config(&self) -> &Path {
        &self.external_config
    }

    pub fn opencode_bin(&self) -> &str {
        &self.opencode_bin
    }
}

/// Map a file name inside the profiles directory back to a profile name.
///
/// Metadata sidecars and non-JSON files yield `None`.
pub fn profile_name_from_file(file_name: &str) -> Option<&str> {
    if file_name.ends_with(META_SUFFIX) {
        return None;
    }
    file_name
        .strip_suffix(PROFILE_SUFFIX)
        .filter(|stem| !stem.is_empty())
}
