use std::io::Write;

use clap::{Subcommand, ValueEnum};
use focuslife_core::storage::{Config, Database};
use focuslife_core::timer::{EngineMode, SharedTimer, TimerStatus};
use focuslife_core::Event;

use crate::sink;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the timer, or pause it if it is running
    Toggle,
    /// Return to idle at the current mode's default duration
    Reset,
    /// Start a one-off countdown of the given length
    Custom {
        /// Countdown length in minutes
        minutes: u64,
    },
    /// Switch between countdown and stopwatch
    Mode { mode: ModeArg },
    /// Print current timer state as JSON
    Status,
    /// Poll the timer, refreshing the display until a phase completes
    Watch,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Timer,
    Stopwatch,
}

impl From<ModeArg> for EngineMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Timer => EngineMode::Timer,
            ModeArg::Stopwatch => EngineMode::Stopwatch,
        }
    }
}

fn open_timer(config: &Config) -> Result<SharedTimer<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(SharedTimer::open(
        db,
        sink::from_config(config),
        config.default_preset(),
    ))
}

fn print_snapshot(timer: &SharedTimer<Database>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&timer.snapshot())?);
    Ok(())
}

/// Record a finished phase for the stats command. Best-effort.
fn record_completion(timer: &SharedTimer<Database>, event: &Event) {
    let Event::PhaseCompleted {
        finished_phase,
        finished_secs,
        at,
        ..
    } = event
    else {
        return;
    };
    let preset_name = timer.preset().name;
    let started_at = *at - chrono::Duration::seconds(*finished_secs as i64);
    let result = timer.with_store(|db| {
        db.record_session(*finished_phase, &preset_name, finished_secs / 60, started_at, *at)
    });
    if let Err(e) = result {
        eprintln!("Warning: failed to record session: {e}");
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let timer = open_timer(&config)?;

    match action {
        TimerAction::Toggle => {
            timer.toggle();
            print_snapshot(&timer)?;
        }
        TimerAction::Reset => {
            timer.reset();
            print_snapshot(&timer)?;
        }
        TimerAction::Custom { minutes } => {
            if timer.start_custom(minutes).is_none() {
                return Err("countdown length must be at least one minute".into());
            }
            print_snapshot(&timer)?;
        }
        TimerAction::Mode { mode } => {
            timer.switch_engine_mode(mode.into());
            print_snapshot(&timer)?;
        }
        TimerAction::Status => {
            // Tick so a countdown that ran out while the process was away
            // completes now.
            let completed = timer.tick();
            print_snapshot(&timer)?;
            if let Some(event) = completed {
                println!("{}", serde_json::to_string_pretty(&event)?);
                record_completion(&timer, &event);
            }
        }
        TimerAction::Watch => {
            watch(&timer, &config)?;
        }
    }

    Ok(())
}

/// Poll until a countdown completes (or forever for a stopwatch), redrawing
/// the remaining/elapsed value in place. The cadence only affects display
/// smoothness; the value is recomputed from timestamps every pass.
fn watch(
    timer: &SharedTimer<Database>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = std::time::Duration::from_millis(config.timer.tick_interval_ms.max(100));

    loop {
        let completed = timer.tick();
        let snapshot = timer.snapshot();
        if let Event::StateSnapshot {
            status,
            phase,
            engine_mode,
            value_secs,
            ..
        } = &snapshot
        {
            let label = match engine_mode {
                EngineMode::Stopwatch => "STOPWATCH",
                EngineMode::Timer => match phase {
                    focuslife_core::Phase::Work => "WORK",
                    focuslife_core::Phase::Break => "BREAK",
                },
            };
            print!("\r{label} {}  ", fmt_clock(*value_secs));
            std::io::stdout().flush()?;

            if let Some(event) = completed {
                println!();
                println!("{}", serde_json::to_string_pretty(&event)?);
                record_completion(timer, &event);
                return Ok(());
            }
            if *status != TimerStatus::Running {
                println!();
                return Ok(());
            }
        }
        std::thread::sleep(interval);
    }
}

fn fmt_clock(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}
