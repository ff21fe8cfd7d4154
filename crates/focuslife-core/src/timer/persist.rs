//! Snapshot persistence over a [`SnapshotStore`].
//!
//! The engine state is written through as individual string-valued keys after
//! every mutation and read back once at startup. Each field falls back
//! independently to its compiled-in default on a missing or malformed value;
//! a load never fails.

use crate::error::Result;
use crate::storage::SnapshotStore;

use super::engine::{EngineMode, FocusEngine, Phase, TimerStatus};
use super::preset::Preset;

pub const KEY_ENGINE_MODE: &str = "focus_timer.engine_mode";
pub const KEY_STATUS: &str = "focus_timer.status";
pub const KEY_PHASE: &str = "focus_timer.phase";
pub const KEY_TOTAL: &str = "focus_timer.total_secs";
pub const KEY_PRESET: &str = "focus_timer.preset";
/// Base value: the running interval's captured value, or the current value
/// when not running.
pub const KEY_BASE: &str = "focus_timer.base_secs";
/// Present only while running.
pub const KEY_ANCHOR: &str = "focus_timer.anchor_ms";

/// Write the engine state through to the store.
///
/// # Errors
/// Returns an error if a store write fails. Callers treat the snapshot as
/// authoritative in memory regardless.
pub fn save(engine: &FocusEngine, store: &mut dyn SnapshotStore) -> Result<()> {
    store.set(KEY_ENGINE_MODE, mode_str(engine.engine_mode()))?;
    store.set(KEY_STATUS, status_str(engine.status()))?;
    store.set(KEY_PHASE, phase_str(engine.phase()))?;
    store.set(KEY_TOTAL, &engine.total_secs().to_string())?;
    store.set(KEY_PRESET, &serde_json::to_string(engine.preset())?)?;

    match engine.anchor_epoch_ms() {
        Some(anchor) => {
            store.set(KEY_BASE, &engine.base_secs().to_string())?;
            store.set(KEY_ANCHOR, &anchor.to_string())?;
        }
        None => {
            store.set(KEY_BASE, &engine.value_secs().to_string())?;
            store.remove(KEY_ANCHOR)?;
        }
    }
    Ok(())
}

/// Reconstruct the engine from the store against the current wall clock.
///
/// Never fails: unknown enum strings, unparsable numbers and malformed preset
/// JSON all degrade to defaults, and a Running status without an anchor (a
/// contradictory snapshot) degrades to Idle. A countdown already past its
/// target reloads as Running at zero; the caller's first `tick` fires the
/// single completion.
pub fn load(
    store: &dyn SnapshotStore,
    default_preset: Preset,
    now_epoch_ms: u64,
) -> FocusEngine {
    let preset = read(store, KEY_PRESET)
        .and_then(|s| serde_json::from_str::<Preset>(&s).ok())
        .unwrap_or(default_preset);

    let engine_mode = match read(store, KEY_ENGINE_MODE).as_deref() {
        Some("stopwatch") => EngineMode::Stopwatch,
        _ => EngineMode::Timer,
    };
    let phase = match read(store, KEY_PHASE).as_deref() {
        Some("break") => Phase::Break,
        _ => Phase::Work,
    };
    let mut status = match read(store, KEY_STATUS).as_deref() {
        Some("running") => TimerStatus::Running,
        Some("paused") => TimerStatus::Paused,
        _ => TimerStatus::Idle,
    };

    let default_total = match engine_mode {
        EngineMode::Timer => preset.phase_secs(phase),
        EngineMode::Stopwatch => 0,
    };
    let total_secs = read(store, KEY_TOTAL)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default_total);
    let mut base_secs = read(store, KEY_BASE)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default_total);

    let mut anchor_epoch_ms = read(store, KEY_ANCHOR).and_then(|s| s.parse::<u64>().ok());

    match status {
        TimerStatus::Running if anchor_epoch_ms.is_none() => {
            // Contradictory snapshot; a running timer always has an anchor.
            status = TimerStatus::Idle;
        }
        TimerStatus::Running => {}
        _ => anchor_epoch_ms = None,
    }

    if engine_mode == EngineMode::Timer {
        base_secs = base_secs.min(total_secs);
    }

    let mut engine = FocusEngine::from_parts(
        engine_mode,
        status,
        phase,
        preset,
        base_secs,
        total_secs,
        anchor_epoch_ms,
        base_secs,
    );
    engine.refresh_value_at(now_epoch_ms);
    engine
}

fn read(store: &dyn SnapshotStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Warning: failed to read {key}: {e}");
            None
        }
    }
}

fn mode_str(mode: EngineMode) -> &'static str {
    match mode {
        EngineMode::Timer => "timer",
        EngineMode::Stopwatch => "stopwatch",
    }
}

fn status_str(status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Idle => "idle",
        TimerStatus::Running => "running",
        TimerStatus::Paused => "paused",
    }
}

fn phase_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Work => "work",
        Phase::Break => "break",
    }
}
