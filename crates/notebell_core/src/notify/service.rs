//! Note-level notification adapter.
//!
//! # Responsibility
//! - Turn a note reminder (due date + optional time) into one platform
//!   notification keyed by the note id.
//! - Absorb permission checks and best-effort cancellation.
//!
//! # Invariants
//! - `schedule_notification` re-requests permission at most once.
//! - An existing notification for the id is cancelled before scheduling.
//! - `cancel_*` never return errors; failures are logged.
//! - Log events carry ids only, never titles or bodies.

use crate::notify::platform::{
    NotificationContent, NotificationPlatform, NotificationPriority, NotificationRequest,
};
use crate::notify::{NotifyError, NotifyResult};
use crate::reminder::trigger::trigger_epoch_ms;
use chrono::Local;
use log::{error, info, warn};

const TITLE_PREFIX: &str = "Reminder: ";

/// Sound/vibration flags applied to every scheduled payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertStyle {
    pub sound: bool,
    pub vibrate: bool,
}

impl Default for AlertStyle {
    fn default() -> Self {
        Self {
            sound: true,
            vibrate: true,
        }
    }
}

pub struct NotificationService<P: NotificationPlatform> {
    platform: P,
    style: AlertStyle,
}

impl<P: NotificationPlatform> NotificationService<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            style: AlertStyle::default(),
        }
    }

    pub fn set_alert_style(&mut self, style: AlertStyle) {
        self.style = style;
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Returns whether notifications are currently permitted.
    pub fn check_permissions(&self) -> bool {
        match self.platform.permission_status() {
            Ok(status) => status.is_granted(),
            Err(err) => {
                error!("event=notification_permission_check module=notify status=error error={err}");
                false
            }
        }
    }

    /// Prompts for permission; returns whether it is granted afterwards.
    pub fn request_permissions(&self) -> bool {
        match self.platform.request_permission() {
            Ok(status) => {
                info!(
                    "event=notification_permission_request module=notify status=ok permission={}",
                    status.as_str()
                );
                status.is_granted()
            }
            Err(err) => {
                error!("event=notification_permission_request module=notify status=error error={err}");
                false
            }
        }
    }

    /// Schedules the reminder for `note_id` and returns its trigger in epoch
    /// milliseconds, replacing any notification pending for the same id.
    ///
    /// # Errors
    /// - `PermissionDenied` when permission stays refused after one request.
    /// - `Trigger` when the due date or time cannot be resolved locally.
    /// - `Db`/`InvalidData` when the platform rejects the request.
    pub fn schedule_notification(
        &self,
        note_id: &str,
        title: &str,
        body: &str,
        due_date: &str,
        reminder_time: Option<&str>,
    ) -> NotifyResult<i64> {
        if !self.check_permissions() && !self.request_permissions() {
            warn!(
                "event=notification_schedule module=notify status=rejected note_id={note_id} error_code=permission_denied"
            );
            return Err(NotifyError::PermissionDenied);
        }

        let trigger_at_ms = trigger_epoch_ms(due_date, reminder_time, &Local)?;
        self.cancel_notification(note_id);

        let request = NotificationRequest {
            identifier: note_id.to_string(),
            content: NotificationContent {
                title: format!("{TITLE_PREFIX}{title}"),
                body: body.to_string(),
                sound: self.style.sound,
                vibrate: self.style.vibrate,
                priority: NotificationPriority::High,
            },
            trigger_at_ms,
        };

        match self.platform.schedule(&request) {
            Ok(()) => {
                info!(
                    "event=notification_schedule module=notify status=ok note_id={note_id} trigger_at_ms={trigger_at_ms}"
                );
                Ok(trigger_at_ms)
            }
            Err(err) => {
                error!(
                    "event=notification_schedule module=notify status=error note_id={note_id} error={err}"
                );
                Err(err)
            }
        }
    }

    /// Cancels the notification for `note_id`, if any.
    pub fn cancel_notification(&self, note_id: &str) {
        if let Err(err) = self.platform.cancel(note_id) {
            warn!(
                "event=notification_cancel module=notify status=error note_id={note_id} error={err}"
            );
        }
    }

    pub fn cancel_all_notifications(&self) {
        match self.platform.cancel_all() {
            Ok(()) => info!("event=notification_cancel_all module=notify status=ok"),
            Err(err) => {
                warn!("event=notification_cancel_all module=notify status=error error={err}")
            }
        }
    }

    /// Pending notification for `note_id`, if any.
    pub fn scheduled_for(&self, note_id: &str) -> Option<NotificationRequest> {
        self.scheduled_notifications()
            .into_iter()
            .find(|request| request.identifier == note_id)
    }

    /// Makes `previous` the only notification for `note_id` again; `None`
    /// leaves nothing scheduled.
    pub fn restore_notification(&self, note_id: &str, previous: Option<&NotificationRequest>) {
        self.cancel_notification(note_id);
        let Some(request) = previous else {
            return;
        };
        if let Err(err) = self.platform.schedule(request) {
            error!(
                "event=notification_restore module=notify status=error note_id={note_id} error={err}"
            );
        }
    }

    /// Lists pending notifications, or nothing when the platform fails.
    pub fn scheduled_notifications(&self) -> Vec<NotificationRequest> {
        self.platform.pending().unwrap_or_else(|err| {
            error!("event=notification_list module=notify status=error error={err}");
            Vec::new()
        })
    }
}
