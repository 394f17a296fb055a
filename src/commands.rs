//! User-facing command handlers.
//!
//! Each handler composes the storage, registry and profile operations and
//! prints its result to stdout. Errors are returned to `main`, which reports
//! them and exits with code 1.

use crate::error::Result;
use crate::launch;
use crate::profile::{self, ContentSource};
use crate::registry;
use crate::storage::{ProfileMeta, Storage};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn sorted_profiles(storage: &Storage) -> Result<Vec<String>> {
    let mut names = registry::list_profiles(storage.paths())?;
    names.sort();
    Ok(names)
}

fn print_meta(meta: &ProfileMeta) {
    if let Some(desc) = &meta.description {
        println!("  Description: {}", desc);
    }
    println!("  Created: {}", meta.created_at.format(TIME_FORMAT));
}

/// Status shown when no subcommand is given.
pub fn status(storage: &Storage) -> Result<()> {
    let state = storage.read_state();
    match &state.current_profile {
        Some(name) => println!("Active profile: {}", name),
        None => println!("No active profile."),
    }
    let count = registry::list_profiles(storage.paths())?.len();
    println!("Profiles: {} (see them with: ocm list)", count);
    Ok(())
}

/// List all profiles
pub fn list(storage: &Storage) -> Result<()> {
    let dir = storage.paths().profiles_dir();
    let names = sorted_profiles(storage)?;
    if names.is_empty() {
        println!("No profiles found in {}.", dir.display());
        println!("Create one from your current OpenCode config with: ocm create <name>");
        return Ok(());
    }

    let current = storage.read_state().current_profile;
    println!("Profiles in {}:", dir.display());
    for name in names {
        let marker = if current.as_deref() == Some(name.as_str()) {
            " (current)"
        } else {
            ""
        };
        match storage
            .read_profile_meta(&name)
            .and_then(|meta| meta.description)
        {
            Some(desc) => println!(" - {}{}: {}", name, marker, desc),
            None => println!(" - {}{}", name, marker),
        }
    }
    Ok(())
}

/// Show the current profile
pub fn current(storage: &Storage) -> Result<()> {
    let state = storage.read_state();
    let Some(name) = state.current_profile else {
        println!("No profile is currently active.");
        println!("Switch to one with: ocm use <name>");
        return Ok(());
    };

    println!("Current profile: {}", name);
    if !registry::exists(storage.paths(), &name) {
        println!("  (profile file is missing)");
    }
    if let Some(meta) = storage.read_profile_meta(&name) {
        print_meta(&meta);
    }
    if let Some(last_used) = state.last_used {
        println!("  Last switched: {}", last_used.format(TIME_FORMAT));
    }
    Ok(())
}

/// Create a profile
pub fn create(storage: &Storage, name: &str, description: Option<String>, empty: bool) -> Result<()> {
    let created = profile::create(storage, name, description, empty)?;
    let external = storage.paths().external_config();
    match created.source {
        ContentSource::ActiveConfig => {
            println!("Copied current OpenCode config from {}", external.display())
        }
        ContentSource::Empty => println!("Using an empty configuration"),
        ContentSource::EmptyFallback => println!(
            "No OpenCode config at {}; using an empty configuration",
            external.display()
        ),
    }
    println!(
        "✓ Profile '{}' created successfully at {}",
        name,
        created.path.display()
    );
    Ok(())
}

/// Switch to a profile
pub fn use_profile(storage: &Storage, name: &str) -> Result<()> {
    let switched = profile::switch(storage, name)?;
    if let Some(backup) = switched.backup {
        println!("Backed up original OpenCode config as profile '{}'", backup);
    }
    println!(
        "✓ Switched OpenCode config to profile '{}' (wrote to {})",
        name,
        storage.paths().external_config().display()
    );
    Ok(())
}

/// Delete a profile
pub fn delete(storage: &Storage, name: &str, force: bool) -> Result<()> {
    let deleted = profile::delete(storage, name, force)?;
    println!("✓ Deleted profile '{}'", name);
    if deleted.was_current {
        println!("No profile is active now; switch with: ocm use <name>");
    }
    Ok(())
}

/// Edit a profile using the default editor
pub fn edit(storage: &Storage, name: &str) -> Result<()> {
    registry::require(storage.paths(), name)?;
    let editor = launch::resolve_editor();
    println!("Opening profile '{}' with editor: {}", name, editor);
    launch::edit_file(&editor, &storage.paths().profile_path(name))?;
    println!("✓ Profile '{}' edited successfully", name);
    Ok(())
}

/// Launch opencode with a profile, returning its exit code
pub fn run(storage: &Storage, name: &str, args: &[String]) -> Result<i32> {
    registry::require(storage.paths(), name)?;
    println!("Launching opencode with profile '{}'...", name);
    launch::run_with_profile(storage, name, args)
}

/// Copy a profile
pub fn copy(storage: &Storage, source: &str, dest: &str) -> Result<()> {
    profile::copy(storage, source, dest)?;
    println!("✓ Copied profile '{}' to '{}'", source, dest);
    Ok(())
}

/// Rename a profile
pub fn rename(storage: &Storage, origin: &str, new: &str) -> Result<()> {
    let was_current = profile::rename(storage, origin, new)?;
    println!("✓ Profile '{}' renamed to '{}' successfully", origin, new);
    if was_current {
        println!("'{}' remains the active profile", new);
    }
    Ok(())
}

/// Show a profile's details
pub fn show(storage: &Storage, name: &str) -> Result<()> {
    let summary = profile::summarize(storage, name)?;

    println!("Profile: {}", name);
    if let Some(meta) = storage.read_profile_meta(name) {
        print_meta(&meta);
    }
    println!("  Path: {}", storage.paths().profile_path(name).display());

    println!();
    println!("Plugins: {}", summary.plugins.len());
    for plugin in &summary.plugins {
        println!("  - {}", plugin);
    }
    println!("MCP servers: {}", summary.mcp_servers.len());
    for server in &summary.mcp_servers {
        let flag = if server.enabled { "enabled" } else { "disabled" };
        println!("  - {} ({})", server.name, flag);
    }
    println!("Providers: {}", summary.providers.len());
    for provider in &summary.providers {
        println!("  - {}", provider);
    }
    Ok(())
}
