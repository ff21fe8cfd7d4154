use clap::Subcommand;
use focuslife_core::storage::{Config, Database};
use focuslife_core::timer::SharedTimer;

use crate::sink;

#[derive(Subcommand)]
pub enum PresetAction {
    /// List built-in and custom presets as JSON
    List,
    /// Activate a preset by id (forces countdown mode, work phase, idle)
    Select {
        /// Preset id, e.g. "pomo-short" or "deep-work"
        id: String,
    },
}

pub fn run(action: PresetAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        PresetAction::List => {
            println!("{}", serde_json::to_string_pretty(&config.presets())?);
        }
        PresetAction::Select { id } => {
            let preset = config
                .find_preset(&id)
                .ok_or_else(|| format!("unknown preset: {id}"))?;
            let db = Database::open()?;
            let timer = SharedTimer::open(db, sink::from_config(&config), config.default_preset());
            timer.select_preset(preset);
            println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
        }
    }

    Ok(())
}
