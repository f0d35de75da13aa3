use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A stubbed demo chat that echoes your messages back through a fake model.
#[derive(Parser)]
#[command(version, about, long_about = None, author)]
pub struct Cli {
    /// Model to switch to on startup (e.g., 'grok-2', 'mini')
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to the JSON state file (defaults to the user data directory)
    #[arg(long, env = "PALAVER_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Additional catalog files to load (repeatable)
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalogs: Vec<PathBuf>,

    /// Keep the conversation in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Chat interactively in the terminal (default)
    Chat,
    /// Send a single message and print the reply
    Send {
        /// Post the text as a host message: it is shown as an assistant reply
        /// with no user turn
        #[arg(long)]
        host: bool,
        /// Message text; remaining arguments are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List the models in the catalog
    Models,
    /// Manage user preferences
    Preferences {
        #[command(subcommand)]
        action: PreferencesCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum PreferencesCommands {
    /// Show current preferences
    Show,
    /// Edit preferences file in default editor
    Edit,
    /// Reset preferences to defaults
    Reset,
}
