//! Notification seam.
//!
//! The engine decides *when* an alert should be raised; delivery belongs to
//! the host. Sinks are best-effort: a failed or unavailable alert never
//! affects a timer state transition.

use crate::error::NotifyError;
use crate::timer::{Phase, Preset};

/// Icon reference passed to sinks. Hosts map it to whatever their
/// notification backend expects.
pub const ALERT_ICON: &str = "alarm-clock";

/// Accepts a request to surface a user-visible alert.
pub trait NotificationSink {
    /// Deliver a notification. Failure must be non-fatal to the caller.
    ///
    /// # Errors
    /// Returns an error if delivery fails or notifications are unavailable.
    fn notify(&self, title: &str, body: &str, icon: Option<&str>) -> Result<(), NotifyError>;
}

/// Sink that drops every notification. Useful headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _title: &str, _body: &str, _icon: Option<&str>) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Title/body pair for a completed countdown phase.
pub fn completion_alert(finished: Phase, preset: &Preset) -> (String, String) {
    match finished {
        Phase::Work => (
            "Focus session complete!".to_string(),
            format!(
                "You stayed focused for {} minutes. Time for a break.",
                preset.work_min
            ),
        ),
        Phase::Break => (
            "Break is over!".to_string(),
            "Back to work.".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_alert_cites_the_preset_minutes() {
        let preset = Preset::new("t", "Test", 50, 10);
        let (title, body) = completion_alert(Phase::Work, &preset);
        assert!(title.contains("complete"));
        assert!(body.contains("50 minutes"));
    }

    #[test]
    fn break_alert_calls_back_to_work() {
        let (title, body) = completion_alert(Phase::Break, &Preset::default());
        assert!(title.contains("Break"));
        assert_eq!(body, "Back to work.");
    }

    #[test]
    fn null_sink_swallows_everything() {
        assert!(NullSink.notify("t", "b", Some(ALERT_ICON)).is_ok());
    }
}
