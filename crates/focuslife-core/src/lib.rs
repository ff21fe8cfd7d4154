//! # FocusLife Core Library
//!
//! This library provides the core logic for the FocusLife focus timer.
//! It implements a CLI-first philosophy where all operations are available
//! via a standalone CLI binary, with any GUI being a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for progress updates. The current
//!   value is always re-derived from an absolute anchor timestamp, never from
//!   counted interval firings, so background throttling and process restarts
//!   cannot skew it.
//! - **Storage**: SQLite-based snapshot/session storage and TOML-based
//!   configuration
//! - **Notification seam**: a best-effort sink for completion alerts
//!
//! ## Key Components
//!
//! - [`FocusEngine`]: Core timer state machine
//! - [`SharedTimer`]: Observable process-wide handle over one engine
//! - [`Database`]: Snapshot and session persistence
//! - [`Config`]: Application configuration management
//! - [`NotificationSink`]: Trait for completion alert delivery

pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, NotifyError, StorageError};
pub use events::Event;
pub use notify::{NotificationSink, NullSink};
pub use storage::{Config, Database, MemoryStore, SnapshotStore, Stats};
pub use timer::{EngineMode, FocusEngine, Phase, Preset, SharedTimer, TimerStatus};
