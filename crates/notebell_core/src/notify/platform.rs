//! Platform notification service contract.

use crate::notify::NotifyResult;
use serde::{Deserialize, Serialize};

/// Permission state reported by the notification platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// The user has not been asked yet.
    Undetermined,
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undetermined => "undetermined",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "undetermined" => Some(Self::Undetermined),
            "granted" => Some(Self::Granted),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }

    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

/// Delivery priority hint, mirroring Android channel importance levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Min,
    Low,
    Default,
    High,
    Max,
}

impl NotificationPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Low => "low",
            Self::Default => "default",
            Self::High => "high",
            Self::Max => "max",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "min" => Some(Self::Min),
            "low" => Some(Self::Low),
            "default" => Some(Self::Default),
            "high" => Some(Self::High),
            "max" => Some(Self::Max),
            _ => None,
        }
    }
}

/// User-visible payload of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: bool,
    pub vibrate: bool,
    pub priority: NotificationPriority,
}

/// One-shot notification request keyed by `identifier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub identifier: String,
    pub content: NotificationContent,
    /// Unix epoch milliseconds.
    pub trigger_at_ms: i64,
}

/// OS-level notification service.
///
/// Implementations own delivery; the application never reconciles its note
/// list against what the platform reports as pending.
pub trait NotificationPlatform {
    fn permission_status(&self) -> NotifyResult<PermissionStatus>;
    /// Prompts for permission and returns the resulting status.
    fn request_permission(&self) -> NotifyResult<PermissionStatus>;
    /// Schedules `request`, replacing a pending request with the same id.
    fn schedule(&self, request: &NotificationRequest) -> NotifyResult<()>;
    /// Cancels a pending request. Unknown ids are not an error.
    fn cancel(&self, identifier: &str) -> NotifyResult<()>;
    fn cancel_all(&self) -> NotifyResult<()>;
    /// Lists pending requests ordered by trigger time.
    fn pending(&self) -> NotifyResult<Vec<NotificationRequest>>;
}
