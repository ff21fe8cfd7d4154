use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{EngineMode, Phase, TimerStatus};

/// Every state change in the engine produces an Event.
/// UI surfaces subscribe to them; the CLI prints them as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        engine_mode: EngineMode,
        phase: Phase,
        value_secs: u64,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        value_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A countdown phase ran out. The next phase is armed but not started.
    PhaseCompleted {
        finished_phase: Phase,
        /// Duration of the phase that just finished (custom durations
        /// included), for session records.
        finished_secs: u64,
        next_phase: Phase,
        next_secs: u64,
        at: DateTime<Utc>,
    },
    PresetSelected {
        preset_id: String,
        work_min: u64,
        break_min: u64,
        at: DateTime<Utc>,
    },
    EngineModeSwitched {
        engine_mode: EngineMode,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        engine_mode: EngineMode,
        status: TimerStatus,
        phase: Phase,
        value_secs: u64,
        total_secs: u64,
        progress: f64,
        preset_id: String,
        at: DateTime<Utc>,
    },
}

/// Convert epoch milliseconds to a UTC timestamp.
pub(crate) fn at_epoch_ms(epoch_ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(epoch_ms as i64)
        .single()
        .unwrap_or_else(Utc::now)
}
