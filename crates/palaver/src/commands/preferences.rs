use super::Command;
use crate::error::Error;
use async_trait::async_trait;
use eyre::Result;
use palaver_core::preferences::Preferences;
use shell_words::split;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;

pub struct PreferencesCommand {
    pub action: PreferencesAction,
    /// Overrides the preferences file location.
    pub path: Option<PathBuf>,
}

pub enum PreferencesAction {
    Show,
    Edit,
    Reset,
}

#[async_trait]
impl Command for PreferencesCommand {
    async fn execute(&self) -> Result<()> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => Preferences::config_path()?,
        };

        let mut stdout = std::io::stdout();
        match &self.action {
            PreferencesAction::Show => Self::show(&path, &mut stdout).map_err(Into::into),
            PreferencesAction::Edit => Self::edit(&path).map_err(Into::into),
            PreferencesAction::Reset => Self::reset(&path, &mut stdout).map_err(Into::into),
        }
    }
}

impl PreferencesCommand {
    fn show(path: &Path, out: &mut impl Write) -> std::result::Result<(), Error> {
        let prefs = Preferences::load_from(path)?;

        writeln!(out, "Preferences file: {}", path.display())?;
        match prefs.state_file() {
            Some(state_file) => writeln!(out, "State file: {}", state_file.display())?,
            None => writeln!(out, "State file: <unavailable>")?,
        }
        writeln!(out, "\n{}", toml::to_string_pretty(&prefs)?)?;
        Ok(())
    }

    fn edit(path: &Path) -> std::result::Result<(), Error> {
        if !path.exists() {
            Preferences::default().save_to(path)?;
        }

        let (editor, mut args) = Self::parse_editor_command()?;
        args.push(path.to_string_lossy().to_string());

        let status = ProcessCommand::new(&editor)
            .args(&args)
            .status()
            .map_err(|err| {
                Error::Process(format!(
                    "Failed to launch editor '{editor}': {err}. Set $VISUAL or $EDITOR to a valid editor."
                ))
            })?;

        if !status.success() {
            return Err(Error::Process(format!(
                "Editor '{editor}' exited with status: {status}"
            )));
        }

        // Surface parse problems now rather than on the next chat start.
        let contents = std::fs::read_to_string(path)?;
        if let Err(e) = toml::from_str::<Preferences>(&contents) {
            return Err(Error::Config(format!(
                "{} is not valid preferences TOML: {e}",
                path.display()
            )));
        }

        Ok(())
    }

    fn parse_editor_command() -> std::result::Result<(String, Vec<String>), Error> {
        let editor = std::env::var("VISUAL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                std::env::var("EDITOR")
                    .ok()
                    .filter(|v| !v.trim().is_empty())
            })
            .unwrap_or_else(|| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "vi".to_string()
                }
            });

        Self::parse_editor_command_str(&editor)
    }

    fn parse_editor_command_str(editor: &str) -> std::result::Result<(String, Vec<String>), Error> {
        let parts = split(editor).map_err(|err| {
            Error::Process(format!(
                "Failed to parse editor command '{editor}': {err}. Set $VISUAL or $EDITOR to a valid editor."
            ))
        })?;

        let Some((command, args)) = parts.split_first() else {
            return Err(Error::Process(
                "Editor command is empty. Set $VISUAL or $EDITOR to a valid editor.".to_string(),
            ));
        };

        Ok((command.to_string(), args.to_vec()))
    }

    fn reset(path: &Path, out: &mut impl Write) -> std::result::Result<(), Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
            writeln!(out, "Preferences reset to defaults")?;
        } else {
            writeln!(out, "No preferences file found")?;
        }
        Ok(())
    }
}
