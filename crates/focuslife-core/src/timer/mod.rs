mod engine;
pub mod persist;
pub mod preset;
mod shared;

pub use engine::{now_ms, EngineMode, FocusEngine, Phase, TimerStatus};
pub use preset::Preset;
pub use shared::SharedTimer;
