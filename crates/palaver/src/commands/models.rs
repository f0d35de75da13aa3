use async_trait::async_trait;
use comfy_table::{Cell, Color, Table};
use eyre::Result;
use palaver_core::model_registry::ModelRegistry;
use std::io::Write;

use super::Command;
use crate::RuntimeOptions;

pub struct ModelsCommand {
    pub options: RuntimeOptions,
}

#[async_trait]
impl Command for ModelsCommand {
    async fn execute(&self) -> Result<()> {
        let config = self.options.app_config()?;
        let mut stdout = std::io::stdout();
        writeln!(stdout, "{}", models_table(&config.model_registry, None))?;
        Ok(())
    }
}

/// Table of catalog entries. The default model is starred and `current`, if
/// given, is highlighted.
pub fn models_table(registry: &ModelRegistry, current: Option<&str>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("").fg(Color::Green),
        Cell::new("Id").fg(Color::Green),
        Cell::new("Label").fg(Color::Green),
        Cell::new("Context").fg(Color::Green),
        Cell::new("Aliases").fg(Color::Green),
    ]);

    for model in registry.list_all() {
        let marker = if model.id == registry.default_id() {
            "*"
        } else {
            ""
        };
        let id = if current == Some(model.id.as_str()) {
            Cell::new(&model.id).fg(Color::Cyan)
        } else {
            Cell::new(&model.id)
        };
        table.add_row(vec![
            Cell::new(marker),
            id,
            Cell::new(&model.label),
            Cell::new(model.context_tokens),
            Cell::new(model.aliases.join(", ")),
        ]);
    }

    table
}
