use clap::Subcommand;
use focuslife_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Aggregate session statistics as JSON
    Show,
    /// Most recent completed sessions, newest first
    Recent {
        /// Maximum number of sessions to print
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&db.stats()?)?);
        }
        StatsAction::Recent { limit } => {
            println!("{}", serde_json::to_string_pretty(&db.recent_sessions(limit)?)?);
        }
    }

    Ok(())
}
