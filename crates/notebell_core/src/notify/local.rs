//! SQLite-backed local notification platform.
//!
//! # Responsibility
//! - Track pending notifications in `scheduled_notifications`.
//! - Hand due notifications to the shell via `take_due`.
//! - Persist the permission decision in `notification_permission`.
//!
//! # Invariants
//! - At most one pending row per identifier (primary key, upsert on schedule).
//! - A delivered notification ceases to exist: `take_due` removes what it
//!   returns in the same transaction.

use crate::notify::platform::{
    NotificationContent, NotificationPlatform, NotificationPriority, NotificationRequest,
    PermissionStatus,
};
use crate::notify::{NotifyError, NotifyResult};
use log::info;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

const REQUEST_SELECT_SQL: &str = "SELECT
    identifier,
    title,
    body,
    sound,
    vibrate,
    priority,
    trigger_at
FROM scheduled_notifications";

/// Outcome applied when the application asks for notification permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionPolicy {
    /// Requests are granted; the shell has no interactive prompt.
    #[default]
    AutoGrant,
    /// Requests are denied until `set_permission` records a grant.
    Deny,
}

pub struct SqliteNotificationPlatform<'conn> {
    conn: &'conn Connection,
    policy: PermissionPolicy,
}

impl<'conn> SqliteNotificationPlatform<'conn> {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: &'conn Connection, policy: PermissionPolicy) -> Self {
        Self { conn, policy }
    }

    /// Records a permission decision made outside the request flow.
    pub fn set_permission(&self, status: PermissionStatus) -> NotifyResult<()> {
        self.conn.execute(
            "UPDATE notification_permission
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = 1;",
            [status.as_str()],
        )?;
        info!(
            "event=notification_permission module=notify status=ok permission={}",
            status.as_str()
        );
        Ok(())
    }

    /// Removes and returns every notification with `trigger_at <= now_ms`.
    pub fn take_due(&self, now_ms: i64) -> NotifyResult<Vec<NotificationRequest>> {
        let tx = self.conn.unchecked_transaction()?;
        let due = {
            let mut stmt = tx.prepare(&format!(
                "{REQUEST_SELECT_SQL}
                 WHERE trigger_at <= ?1
                 ORDER BY trigger_at ASC, identifier ASC;"
            ))?;
            let mut rows = stmt.query([now_ms])?;
            let mut due = Vec::new();
            while let Some(row) = rows.next()? {
                due.push(parse_request_row(row)?);
            }
            due
        };
        tx.execute(
            "DELETE FROM scheduled_notifications WHERE trigger_at <= ?1;",
            [now_ms],
        )?;
        tx.commit()?;

        if !due.is_empty() {
            info!(
                "event=notification_deliver module=notify status=ok count={}",
                due.len()
            );
        }
        Ok(due)
    }
}

impl NotificationPlatform for SqliteNotificationPlatform<'_> {
    fn permission_status(&self) -> NotifyResult<PermissionStatus> {
        let raw: String = self.conn.query_row(
            "SELECT status FROM notification_permission WHERE id = 1;",
            [],
            |row| row.get(0),
        )?;
        PermissionStatus::parse(&raw).ok_or_else(|| {
            NotifyError::InvalidData(format!(
                "invalid permission status `{raw}` in notification_permission.status"
            ))
        })
    }

    fn request_permission(&self) -> NotifyResult<PermissionStatus> {
        let current = self.permission_status()?;
        if current.is_granted() {
            return Ok(current);
        }
        let decided = match self.policy {
            PermissionPolicy::AutoGrant => PermissionStatus::Granted,
            PermissionPolicy::Deny => PermissionStatus::Denied,
        };
        self.set_permission(decided)?;
        Ok(decided)
    }

    fn schedule(&self, request: &NotificationRequest) -> NotifyResult<()> {
        self.conn.execute(
            "INSERT INTO scheduled_notifications (
                identifier,
                title,
                body,
                sound,
                vibrate,
                priority,
                trigger_at,
                scheduled_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, (strftime('%s', 'now') * 1000))
            ON CONFLICT(identifier) DO UPDATE SET
                title = excluded.title,
                body = excluded.body,
                sound = excluded.sound,
                vibrate = excluded.vibrate,
                priority = excluded.priority,
                trigger_at = excluded.trigger_at,
                scheduled_at = excluded.scheduled_at;",
            params![
                request.identifier.as_str(),
                request.content.title.as_str(),
                request.content.body.as_str(),
                bool_to_int(request.content.sound),
                bool_to_int(request.content.vibrate),
                request.content.priority.as_str(),
                request.trigger_at_ms,
            ],
        )?;
        Ok(())
    }

    fn cancel(&self, identifier: &str) -> NotifyResult<()> {
        self.conn.execute(
            "DELETE FROM scheduled_notifications WHERE identifier = ?1;",
            [identifier],
        )?;
        Ok(())
    }

    fn cancel_all(&self) -> NotifyResult<()> {
        self.conn
            .execute_batch("DELETE FROM scheduled_notifications;")?;
        Ok(())
    }

    fn pending(&self) -> NotifyResult<Vec<NotificationRequest>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REQUEST_SELECT_SQL} ORDER BY trigger_at ASC, identifier ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut pending = Vec::new();
        while let Some(row) = rows.next()? {
            pending.push(parse_request_row(row)?);
        }
        Ok(pending)
    }
}

fn parse_request_row(row: &Row<'_>) -> NotifyResult<NotificationRequest> {
    let priority_text: String = row.get("priority")?;
    let priority = NotificationPriority::parse(&priority_text).ok_or_else(|| {
        NotifyError::InvalidData(format!(
            "invalid priority `{priority_text}` in scheduled_notifications.priority"
        ))
    })?;

    Ok(NotificationRequest {
        identifier: row.get("identifier")?,
        content: NotificationContent {
            title: row.get("title")?,
            body: row.get("body")?,
            sound: int_to_bool(row.get("sound")?, "sound")?,
            vibrate: int_to_bool(row.get("vibrate")?, "vibrate")?,
            priority,
        },
        trigger_at_ms: row.get("trigger_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> NotifyResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(NotifyError::InvalidData(format!(
            "invalid {column} value `{other}` in scheduled_notifications.{column}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::{PermissionPolicy, SqliteNotificationPlatform};
    use crate::db::open_db_in_memory;
    use crate::notify::platform::{
        NotificationContent, NotificationPlatform, NotificationPriority, NotificationRequest,
        PermissionStatus,
    };

    fn request(id: &str, trigger_at_ms: i64) -> NotificationRequest {
        NotificationRequest {
            identifier: id.to_string(),
            content: NotificationContent {
                title: format!("Reminder: {id}"),
                body: String::new(),
                sound: true,
                vibrate: false,
                priority: NotificationPriority::High,
            },
            trigger_at_ms,
        }
    }

    #[test]
    fn schedule_replaces_by_identifier() {
        let conn = open_db_in_memory().unwrap();
        let platform = SqliteNotificationPlatform::new(&conn, PermissionPolicy::AutoGrant);

        platform.schedule(&request("n1", 1_000)).unwrap();
        platform.schedule(&request("n1", 5_000)).unwrap();

        let pending = platform.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].trigger_at_ms, 5_000);
        assert!(!pending[0].content.vibrate);
    }

    #[test]
    fn take_due_delivers_once_in_trigger_order() {
        let conn = open_db_in_memory().unwrap();
        let platform = SqliteNotificationPlatform::new(&conn, PermissionPolicy::AutoGrant);
        platform.schedule(&request("late", 3_000)).unwrap();
        platform.schedule(&request("early", 1_000)).unwrap();
        platform.schedule(&request("future", 9_000)).unwrap();

        let due = platform.take_due(3_000).unwrap();
        let ids = due.iter().map(|r| r.identifier.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["early", "late"]);
        assert!(platform.take_due(3_000).unwrap().is_empty());
        assert_eq!(platform.pending().unwrap().len(), 1);
    }

    #[test]
    fn request_permission_follows_policy_and_keeps_grants() {
        let conn = open_db_in_memory().unwrap();
        let denying = SqliteNotificationPlatform::new(&conn, PermissionPolicy::Deny);
        assert_eq!(
            denying.permission_status().unwrap(),
            PermissionStatus::Undetermined
        );
        assert_eq!(
            denying.request_permission().unwrap(),
            PermissionStatus::Denied
        );

        denying.set_permission(PermissionStatus::Granted).unwrap();
        assert_eq!(
            denying.request_permission().unwrap(),
            PermissionStatus::Granted
        );

        let granting = SqliteNotificationPlatform::new(&conn, PermissionPolicy::AutoGrant);
        granting.set_permission(PermissionStatus::Denied).unwrap();
        assert_eq!(
            granting.request_permission().unwrap(),
            PermissionStatus::Granted
        );
    }
}
