use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const SUBMITTED: &str = "Report submitted successfully!";
pub const WEBHOOK_MISSING: &str = "System Error: Webhook URL not configured.";
pub const IDENTITY_MISSING: &str = "Please provide Teacher Name and Class.";
pub const SUBMIT_FAILED: &str = "Submission failed. Check connection.";
pub const SUBMIT_BUSY: &str = "A submission is already in progress.";
pub const SUMMARY_COPIED: &str = "Summary copied to clipboard";
pub const SUMMARY_COPY_FAILED: &str = "Failed to copy summary to clipboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub shown_at: Instant,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            NoticeKind::Success => "✓",
            NoticeKind::Error => "!",
        };
        write!(f, "{marker} {}", self.message)
    }
}

/// Single-slot status line. A new notice replaces the visible one and
/// restarts its timer; nothing is queued.
#[derive(Debug, Clone)]
pub struct StatusSlot {
    duration: Duration,
    current: Option<Notice>,
}

impl StatusSlot {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, kind: NoticeKind, now: Instant) -> &Notice {
        let message = message.into();
        match kind {
            NoticeKind::Success => info!(message = %message, "status"),
            NoticeKind::Error => warn!(message = %message, "status"),
        }

        self.current.insert(Notice {
            message,
            kind,
            shown_at: now,
        })
    }

    /// Visible notice at `now`; an expired notice is dropped.
    pub fn current(&mut self, now: Instant) -> Option<&Notice> {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|notice| now.saturating_duration_since(notice.shown_at) >= self.duration);

        if expired {
            self.current = None;
        }

        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{NoticeKind, StatusSlot};
    use std::time::{Duration, Instant};

    #[test]
    fn notice_expires_after_duration() {
        let start = Instant::now();
        let mut slot = StatusSlot::new(Duration::from_secs(4));
        slot.show("Summary copied to clipboard", NoticeKind::Success, start);

        assert!(slot.current(start + Duration::from_millis(3_999)).is_some());
        assert!(slot.current(start + Duration::from_secs(4)).is_none());
        assert!(slot.current(start).is_none());
    }

    #[test]
    fn new_notice_replaces_and_restarts_timer() {
        let start = Instant::now();
        let mut slot = StatusSlot::new(Duration::from_secs(4));
        slot.show("first", NoticeKind::Success, start);
        slot.show("second", NoticeKind::Error, start + Duration::from_secs(3));

        let visible = slot
            .current(start + Duration::from_secs(5))
            .expect("second notice still visible");
        assert_eq!(visible.message, "second");
        assert_eq!(visible.kind, NoticeKind::Error);

        assert!(slot.current(start + Duration::from_secs(7)).is_none());
    }

    #[test]
    fn clear_hides_immediately() {
        let start = Instant::now();
        let mut slot = StatusSlot::new(Duration::from_secs(4));
        slot.show("first", NoticeKind::Success, start);
        slot.clear();
        assert!(slot.current(start).is_none());
    }
}
