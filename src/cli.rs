use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ocm", version, about = "Manage multiple OpenCode configurations (profiles) and switch/launch", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List saved profiles (shows current active profile)
    #[command(alias = "ls")]
    List,
    /// Show the active profile and its metadata
    Current,
    /// Create a profile from the current OpenCode config (or empty with --empty)
    Create {
        /// Profile name (letters, digits, '-' and '_')
        name: String,
        /// Short description stored with the profile
        #[arg(short, long)]
        description: Option<String>,
        /// Start from an empty configuration instead of the current one
        #[arg(short, long)]
        empty: bool,
    },
    /// Switch the OpenCode config to a profile
    Use { name: String },
    /// Delete a profile
    #[command(alias = "rm")]
    Delete {
        name: String,
        /// Allow deleting the active profile
        #[arg(short, long)]
        force: bool,
    },
    /// Edit a profile with $EDITOR
    Edit { name: String },
    /// Run opencode with a profile without switching to it
    Run {
        name: String,
        /// Arguments passed through to opencode
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Copy a profile under a new name
    #[command(alias = "cp")]
    Copy { source: String, dest: String },
    /// Show plugins, MCP servers and providers of a profile
    Show { name: String },
    /// Rename a profile
    #[command(alias = "mv")]
    Rename { origin: String, new: String },
}
