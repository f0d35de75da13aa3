use clap::Parser;
use eyre::Result;

use palaver::RuntimeOptions;
use palaver::cli::{Cli, Commands, PreferencesCommands};
use palaver::commands::{
    Command,
    chat::ChatCommand,
    models::ModelsCommand,
    preferences::{PreferencesAction, PreferencesCommand},
    send::SendCommand,
};
use palaver_core::preferences::Preferences;
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre for better error reports
    color_eyre::install()?;

    let cli = Cli::parse();

    // Initialize tracing (level configured via RUST_LOG env var)
    palaver_core::utils::tracing::init_tracing()?;

    let preferences = Preferences::load().unwrap_or_else(|e| {
        warn!(target: "palaver::main", error = %e, "Failed to load preferences, using defaults");
        Preferences::default()
    });

    let options = RuntimeOptions {
        preferences,
        model: cli.model,
        state_file: cli.state_file,
        catalogs: cli.catalogs,
        ephemeral: cli.ephemeral,
    };

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => ChatCommand { options }.execute().await,
        Commands::Send { text, host } => {
            SendCommand {
                text: text.join(" "),
                host,
                options,
            }
            .execute()
            .await
        }
        Commands::Models => ModelsCommand { options }.execute().await,
        Commands::Preferences { action } => {
            let cmd = PreferencesCommand {
                action: match action {
                    PreferencesCommands::Show => PreferencesAction::Show,
                    PreferencesCommands::Edit => PreferencesAction::Edit,
                    PreferencesCommands::Reset => PreferencesAction::Reset,
                },
                path: None,
            };
            cmd.execute().await
        }
    }
}
