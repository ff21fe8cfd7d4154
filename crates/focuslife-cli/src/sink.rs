//! Desktop notification sink.
//!
//! Delivers completion alerts through the host notification daemon plus a
//! terminal bell as the audible cue. Failures are reported as errors and
//! swallowed by the caller -- an undeliverable alert never stops the timer.

use std::io::Write;

use focuslife_core::error::NotifyError;
use focuslife_core::notify::{NotificationSink, NullSink};
use focuslife_core::storage::Config;

pub struct DesktopSink;

impl NotificationSink for DesktopSink {
    fn notify(&self, title: &str, body: &str, icon: Option<&str>) -> Result<(), NotifyError> {
        // Audible cue first; the daemon may be slow or absent.
        print!("\x07");
        let _ = std::io::stdout().flush();

        let mut notification = notify_rust::Notification::new();
        notification.summary(title).body(body);
        if let Some(icon) = icon {
            notification.icon(icon);
        }
        notification
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Dispatch(e.to_string()))
    }
}

/// The configured sink: desktop alerts, or a null sink when disabled.
pub fn from_config(config: &Config) -> Box<dyn NotificationSink + Send> {
    if config.notifications.enabled {
        Box::new(DesktopSink)
    } else {
        Box::new(NullSink)
    }
}
