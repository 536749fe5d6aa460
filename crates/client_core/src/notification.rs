use std::time::{Duration, Instant};

pub const CREATE_SUCCEEDED: &str = "Thêm địa điểm mới thành công!";
pub const UPDATE_SUCCEEDED: &str = "Cập nhật địa điểm thành công!";
pub const SAVE_FAILED: &str = "Lỗi khi lưu địa điểm!";
pub const DELETE_SUCCEEDED: &str = "Xoá địa điểm thành công!";
pub const DELETE_FAILED: &str = "Lỗi khi xoá địa điểm!";
pub const RELOAD_FAILED: &str = "Không thể tải lại danh sách địa điểm!";

pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub shown_at: Instant,
}

/// Holds the single live notification. Showing a new one replaces whatever
/// was there, dismissed or not.
#[derive(Debug)]
pub struct Notifier {
    current: Option<Notification>,
    auto_hide: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_HIDE)
    }
}

impl Notifier {
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            current: None,
            auto_hide,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, severity: Severity) -> Notification {
        self.show_at(message, severity, Instant::now())
    }

    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        severity: Severity,
        now: Instant,
    ) -> Notification {
        let notification = Notification {
            message: message.into(),
            severity,
            shown_at: now,
        };
        self.current = Some(notification.clone());
        notification
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn visible_at(&self, now: Instant) -> Option<&Notification> {
        self.current
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.auto_hide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hides_after_auto_hide_elapses() {
        let mut notifier = Notifier::new(Duration::from_millis(4000));
        let start = Instant::now();
        notifier.show_at(CREATE_SUCCEEDED, Severity::Success, start);

        assert!(notifier
            .visible_at(start + Duration::from_millis(3999))
            .is_some());
        assert!(notifier
            .visible_at(start + Duration::from_millis(4000))
            .is_none());
    }

    #[test]
    fn newer_notification_overwrites_previous() {
        let mut notifier = Notifier::default();
        let now = Instant::now();
        notifier.show_at(DELETE_SUCCEEDED, Severity::Success, now);
        notifier.dismiss();
        assert!(notifier.visible_at(now).is_none());

        notifier.show_at(SAVE_FAILED, Severity::Error, now);
        notifier.show_at(UPDATE_SUCCEEDED, Severity::Success, now);
        let visible = notifier.visible_at(now).expect("visible");
        assert_eq!(visible.message, UPDATE_SUCCEEDED);
        assert_eq!(visible.severity, Severity::Success);
    }
}
