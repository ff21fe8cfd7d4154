use serde::{Deserialize, Serialize};

/// A named work/break duration pair selectable by the user.
///
/// Pure timing configuration -- presentation metadata (colors, icons) belongs
/// to whatever renders the timer, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    /// Work phase length in minutes.
    pub work_min: u64,
    /// Break phase length in minutes.
    pub break_min: u64,
}

impl Preset {
    pub fn new(id: &str, name: &str, work_min: u64, break_min: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            work_min,
            break_min,
        }
    }

    /// Work phase length in seconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn work_secs(&self) -> u64 {
        self.work_min.saturating_mul(60)
    }

    /// Break phase length in seconds.
    pub fn break_secs(&self) -> u64 {
        self.break_min.saturating_mul(60)
    }

    /// Duration in seconds for the given phase.
    pub fn phase_secs(&self, phase: super::Phase) -> u64 {
        match phase {
            super::Phase::Work => self.work_secs(),
            super::Phase::Break => self.break_secs(),
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        builtin()
            .into_iter()
            .next()
            .unwrap_or_else(|| Preset::new("pomo-short", "Pomo Short", 25, 5))
    }
}

/// The built-in preset set.
pub fn builtin() -> Vec<Preset> {
    vec![
        Preset::new("pomo-short", "Pomo Short", 25, 5),
        Preset::new("pomo-long", "Pomo Long", 50, 10),
        Preset::new("deep-work", "Deep Work", 90, 20),
        Preset::new("active-mix", "Active Mix", 40, 10),
    ]
}

/// Look up a built-in preset by id.
pub fn find_builtin(id: &str) -> Option<Preset> {
    builtin().into_iter().find(|p| p.id == id)
}
