use std::path::PathBuf;

use serde_json::{Value, json};
use tracing::info;

use crate::error::{Error, Result};
use crate::registry::{self, check_name};
use crate::storage::{LauncherState, ProfileMeta, Storage, now};

const BACKUP_PREFIX: &str = "_backup_";
const BACKUP_DESCRIPTION: &str = "Backup of original OpenCode config before first profile switch";

/// Configuration written for profiles created without a source.
pub fn default_config() -> Value {
    json!({
        "$schema": "https://opencode.ai/config.json",
        "plugin": [],
        "mcp": {},
        "provider": {},
        "agent": {}
    })
}

/// Where a newly created profile's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// `--empty` was requested.
    Empty,
    /// Copied from the active OpenCode config.
    ActiveConfig,
    /// No active config to copy, so the empty default was used.
    EmptyFallback,
}

#[derive(Debug)]
pub struct Created {
    pub path: PathBuf,
    pub source: ContentSource,
}

/// Create a profile from the active OpenCode config, or empty.
pub fn create(
    storage: &Storage,
    name: &str,
    description: Option<String>,
    empty: bool,
) -> Result<Created> {
    check_name(name)?;
    let paths = storage.paths();
    if registry::exists(paths, name) {
        return Err(Error::ProfileExists(name.to_string()));
    }

    let (content, source) = if empty {
        (default_content()?, ContentSource::Empty)
    } else {
        match storage.read_external_config()? {
            Some(content) => (content, ContentSource::ActiveConfig),
            None => (default_content()?, ContentSource::EmptyFallback),
        }
    };

    storage.write_profile(name, &content)?;
    storage.write_profile_meta(name, &ProfileMeta::new(name, description))?;
    info!(profile = name, ?source, "created profile");
    Ok(Created {
        path: paths.profile_path(name),
        source,
    })
}

fn default_content() -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(&default_config())?)
}

#[derive(Debug)]
pub struct Switched {
    /// Name of the backup taken of the original config on the first switch.
    pub backup: Option<String>,
}

/// Copy a profile into the active OpenCode config and mark it current.
pub fn switch(storage: &Storage, name: &str) -> Result<Switched> {
    registry::require(storage.paths(), name)?;

    let state = storage.read_state();
    let mut backup = None;
    if state.current_profile.is_none()
        && let Some(original) = storage.read_external_config()?
    {
        let backup_name = format!("{BACKUP_PREFIX}{}", now().timestamp_millis());
        storage.write_profile(&backup_name, &original)?;
        storage.write_profile_meta(
            &backup_name,
            &ProfileMeta::new(&backup_name, Some(BACKUP_DESCRIPTION.to_string())),
        )?;
        info!(backup = %backup_name, "backed up original OpenCode config");
        backup = Some(backup_name);
    }

    let content = storage.read_profile(name)?;
    storage.write_external_config(&content)?;
    storage.write_state(&LauncherState {
        current_profile: Some(name.to_string()),
        last_used: Some(now()),
    })?;
    info!(profile = name, "switched profile");
    Ok(Switched { backup })
}

#[derive(Debug)]
pub struct Deleted {
    pub was_current: bool,
}

/// Delete a profile; the active one only with `force`.
pub fn delete(storage: &Storage, name: &str, force: bool) -> Result<Deleted> {
    registry::require(storage.paths(), name)?;

    let mut state = storage.read_state();
    let was_current = state.current_profile.as_deref() == Some(name);
    if was_current && !force {
        return Err(Error::ActiveProfile(name.to_string()));
    }

    storage.delete_profile(name)?;
    if was_current {
        state.current_profile = None;
        storage.write_state(&state)?;
    }
    info!(profile = name, was_current, "deleted profile");
    Ok(Deleted { was_current })
}

/// Duplicate `src` as `dest`, noting the origin in the new description.
pub fn copy(storage: &Storage, src: &str, dest: &str) -> Result<()> {
    let paths = storage.paths();
    registry::require(paths, src)?;
    check_name(dest)?;
    if registry::exists(paths, dest) {
        return Err(Error::ProfileExists(dest.to_string()));
    }

    storage.copy_profile(src, dest)?;
    let description = match storage
        .read_profile_meta(src)
        .and_then(|meta| meta.description)
    {
        Some(desc) => format!("Copy of {src}: {desc}"),
        None => format!("Copy of {src}"),
    };
    storage.write_profile_meta(dest, &ProfileMeta::new(dest, Some(description)))?;
    Ok(())
}

/// Rename a profile, keeping its metadata and the current-profile pointer in step.
///
/// Returns whether the renamed profile was the current one.
pub fn rename(storage: &Storage, old: &str, new: &str) -> Result<bool> {
    let paths = storage.paths();
    registry::require(paths, old)?;
    check_name(new)?;
    if registry::exists(paths, new) {
        return Err(Error::ProfileExists(new.to_string()));
    }

    let meta = storage.read_profile_meta(old);
    storage.rename_profile(old, new)?;
    if let Some(mut meta) = meta {
        meta.name = new.to_string();
        storage.write_profile_meta(new, &meta)?;
    }

    let mut state = storage.read_state();
    let was_current = state.current_profile.as_deref() == Some(old);
    if was_current {
        state.current_profile = Some(new.to_string());
        storage.write_state(&state)?;
    }
    Ok(was_current)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServer {
    pub name: String,
    pub enabled: bool,
}

/// What `show` reports about a profile's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSummary {
    pub plugins: Vec<String>,
    pub mcp_servers: Vec<McpServer>,
    pub providers: Vec<String>,
}

/// Parse a profile and collect its plugins, MCP servers and providers.
pub fn summarize(storage: &Storage, name: &str) -> Result<ProfileSummary> {
    registry::require(storage.paths(), name)?;
    let content = storage.read_profile(name)?;
    let config: Value = serde_json::from_slice(&content).map_err(|source| Error::ProfileParse {
        name: name.to_string(),
        source,
    })?;

    let plugins = config
        .get("plugin")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let mcp_servers = config
        .get("mcp")
        .and_then(Value::as_object)
        .map(|servers| {
            servers
                .iter()
                .map(|(name, server)| McpServer {
                    name: name.clone(),
                    enabled: server
                        .get("enabled")
                        .and_then(Value::as_bool)
                        .unwrap_or(true),
                })
                .collect()
        })
        .unwrap_or_default();

    let providers = config
        .get("provider")
        .and_then(Value::as_object)
        .map(|providers| providers.keys().cloned().collect())
        .unwrap_or_default();

    Ok(ProfileSummary {
        plugins,
        mcp_servers,
        providers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paths;
    use std::fs;
    use tempfile::TempDir;

    fn storage(temp: &TempDir) -> Storage {
        let storage = Storage::new(Paths::new(
            temp.path().join("ocm"),
            temp.path().join("opencode").join("opencode.json"),
        ));
        storage.ensure_directories().unwrap();
        storage
    }

    fn json_of(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    fn backups(storage: &Storage) -> Vec<String> {
        registry::list_profiles(storage.paths())
            .unwrap()
            .into_iter()
            .filter(|n| n.starts_with(BACKUP_PREFIX))
            .collect()
    }

    #[test]
    fn create_copies_active_config() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        let active = br#"{"plugin":["a"],"mcp":{},"provider":{},"agent":{}}"#;
        storage.write_external_config(active).unwrap();

        let created = create(&storage, "work", Some("day job".into()), false).unwrap();

        assert_eq!(created.source, ContentSource::ActiveConfig);
        assert!(registry::exists(storage.paths(), "work"));
        assert_eq!(storage.read_profile("work").unwrap(), active);
        let meta = storage.read_profile_meta("work").unwrap();
        assert_eq!(meta.name, "work");
        assert_eq!(meta.description.as_deref(), Some("day job"));
    }

    #[test]
    fn create_empty_ignores_active_config() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        storage.write_external_config(br#"{"plugin":["a"]}"#).unwrap();

        let created = create(&storage, "blank", None, true).unwrap();

        assert_eq!(created.source, ContentSource::Empty);
        assert_eq!(json_of(&storage.read_profile("blank").unwrap()), default_config());
    }

    #[test]
    fn create_falls_back_to_empty_without_active_config() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);

        let created = create(&storage, "fresh", None, false).unwrap();

        assert_eq!(created.source, ContentSource::EmptyFallback);
        assert_eq!(json_of(&storage.read_profile("fresh").unwrap()), default_config());
    }

    #[test]
    fn create_rejects_bad_names_and_collisions() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);

        assert!(matches!(
            create(&storage, "abc def", None, true),
            Err(Error::InvalidName(_))
        ));
        assert!(registry::list_profiles(storage.paths()).unwrap().is_empty());

        create(&storage, "dup", None, true).unwrap();
        assert!(matches!(
            create(&storage, "dup", None, true),
            Err(Error::ProfileExists(_))
        ));
    }

    #[test]
    fn first_switch_backs_up_original_config_once() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        let original = br#"{"plugin":["original"]}"#;
        storage.write_external_config(original).unwrap();
        create(&storage, "a", None, true).unwrap();
        create(&storage, "b", None, true).unwrap();
        fs::write(storage.paths().profile_path("b"), br#"{"plugin":["b"]}"#).unwrap();

        let first = switch(&storage, "a").unwrap();
        let backup = first.backup.expect("first switch should back up");
        assert_eq!(backups(&storage), vec![backup.clone()]);
        assert_eq!(storage.read_profile(&backup).unwrap(), original);
        assert_eq!(
            storage.read_profile_meta(&backup).unwrap().description.as_deref(),
            Some(BACKUP_DESCRIPTION)
        );

        let second = switch(&storage, "b").unwrap();
        assert!(second.backup.is_none());
        assert_eq!(backups(&storage).len(), 1);
    }

    #[test]
    fn switch_mirrors_profile_and_updates_state() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        storage.write_profile("work", br#"{"provider":{"x":{}}}"#).unwrap();

        let switched = switch(&storage, "work").unwrap();

        assert!(switched.backup.is_none(), "nothing to back up");
        assert_eq!(
            storage.read_external_config().unwrap().unwrap(),
            storage.read_profile("work").unwrap()
        );
        let state = storage.read_state();
        assert_eq!(state.current_profile.as_deref(), Some("work"));
        assert!(state.last_used.is_some());
    }

    #[test]
    fn switch_to_missing_profile_changes_nothing() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        storage.write_external_config(b"{}").unwrap();

        assert!(matches!(switch(&storage, "ghost"), Err(Error::ProfileNotFound(_))));
        assert!(backups(&storage).is_empty());
        assert_eq!(storage.read_state(), LauncherState::default());
    }

    #[test]
    fn deleting_current_profile_requires_force() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        create(&storage, "work", None, true).unwrap();
        switch(&storage, "work").unwrap();
        let before = storage.read_state();

        assert!(matches!(
            delete(&storage, "work", false),
            Err(Error::ActiveProfile(_))
        ));
        assert_eq!(storage.read_state(), before);
        assert!(registry::exists(storage.paths(), "work"));

        let deleted = delete(&storage, "work", true).unwrap();
        assert!(deleted.was_current);
        assert!(!registry::exists(storage.paths(), "work"));
        assert!(!storage.paths().meta_path("work").exists());
        let after = storage.read_state();
        assert_eq!(after.current_profile, None);
        assert_eq!(after.last_used, before.last_used);
    }

    #[test]
    fn deleting_other_profile_leaves_state_alone() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        create(&storage, "a", None, true).unwrap();
        create(&storage, "b", None, true).unwrap();
        switch(&storage, "a").unwrap();

        assert!(!delete(&storage, "b", false).unwrap().was_current);
        assert_eq!(storage.read_state().current_profile.as_deref(), Some("a"));
        assert!(matches!(delete(&storage, "b", false), Err(Error::ProfileNotFound(_))));
    }

    #[test]
    fn lookups_cannot_escape_profiles_dir() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        create(&storage, "work", None, true).unwrap();
        switch(&storage, "work").unwrap();
        let state_path = storage.paths().state_path();

        assert!(matches!(
            delete(&storage, "../state", true),
            Err(Error::InvalidName(_))
        ));
        assert!(state_path.exists());
        assert!(matches!(switch(&storage, "../state"), Err(Error::InvalidName(_))));
        assert!(matches!(summarize(&storage, "../state"), Err(Error::InvalidName(_))));
        assert!(matches!(
            copy(&storage, "../state", "stolen"),
            Err(Error::InvalidName(_))
        ));
        assert_eq!(storage.read_state().current_profile.as_deref(), Some("work"));
    }

    #[test]
    fn copy_duplicates_content_and_notes_origin() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        create(&storage, "src", Some("team setup".into()), true).unwrap();

        copy(&storage, "src", "dest").unwrap();

        assert_eq!(
            storage.read_profile("dest").unwrap(),
            storage.read_profile("src").unwrap()
        );
        let meta = storage.read_profile_meta("dest").unwrap();
        assert_eq!(meta.name, "dest");
        assert_eq!(meta.description.as_deref(), Some("Copy of src: team setup"));
    }

    #[test]
    fn copy_validates_source_and_destination() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        create(&storage, "src", None, true).unwrap();
        create(&storage, "taken", None, true).unwrap();

        assert!(matches!(copy(&storage, "ghost", "x"), Err(Error::ProfileNotFound(_))));
        assert!(matches!(copy(&storage, "src", "a/b"), Err(Error::InvalidName(_))));
        assert!(matches!(copy(&storage, "src", "taken"), Err(Error::ProfileExists(_))));
    }

    #[test]
    fn rename_moves_metadata_and_current_pointer() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        create(&storage, "old", Some("keep me".into()), true).unwrap();
        let created_at = storage.read_profile_meta("old").unwrap().created_at;
        switch(&storage, "old").unwrap();

        assert!(rename(&storage, "old", "new").unwrap());

        assert!(!registry::exists(storage.paths(), "old"));
        assert!(!storage.paths().meta_path("old").exists());
        let meta = storage.read_profile_meta("new").unwrap();
        assert_eq!(meta.name, "new");
        assert_eq!(meta.created_at, created_at);
        assert_eq!(meta.description.as_deref(), Some("keep me"));
        assert_eq!(storage.read_state().current_profile.as_deref(), Some("new"));
    }

    #[test]
    fn summarize_counts_items_and_defaults_enabled() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        storage
            .write_profile(
                "full",
                br#"{
                    "plugin": ["opencode-foo", "opencode-bar"],
                    "mcp": {
                        "github": { "type": "remote" },
                        "local": { "type": "local", "enabled": false }
                    },
                    "provider": { "anthropic": {} }
                }"#,
            )
            .unwrap();

        let summary = summarize(&storage, "full").unwrap();

        assert_eq!(summary.plugins, vec!["opencode-foo", "opencode-bar"]);
        assert_eq!(
            summary.mcp_servers,
            vec![
                McpServer { name: "github".into(), enabled: true },
                McpServer { name: "local".into(), enabled: false },
            ]
        );
        assert_eq!(summary.providers, vec!["anthropic"]);
    }

    #[test]
    fn summarize_tolerates_missing_sections_but_not_bad_json() {
        let temp = TempDir::new().unwrap();
        let storage = storage(&temp);
        storage.write_profile("sparse", b"{}").unwrap();
        storage.write_profile("broken", b"{\"plugin\": [").unwrap();

        assert_eq!(summarize(&storage, "sparse").unwrap(), ProfileSummary::default());
        assert!(matches!(
            summarize(&storage, "broken"),
            Err(Error::ProfileParse { .. })
        ));
    }
}
