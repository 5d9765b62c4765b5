//! Schema steps for the NoteBell database.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - All pending steps run in one transaction; `user_version` only moves
//!   when every step succeeded.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "kv_store_and_schedule",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "notification_permission",
        sql: include_str!("0002_notification_permission.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `SchemaTooNew` when the file is ahead of this build.
/// - `Migration` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    if found == supported {
        return Ok(());
    }

    let tx = conn.transaction()?;
    run_steps(&tx, STEPS, found)?;
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    Ok(())
}

fn run_steps(tx: &Transaction<'_>, steps: &[SchemaStep], found: u32) -> DbResult<()> {
    for step in steps.iter().filter(|step| step.version > found) {
        let wrap = |source| DbError::Migration {
            version: step.version,
            name: step.name,
            source,
        };
        tx.execute_batch(step.sql).map_err(wrap)?;
        tx.pragma_update(None, "user_version", step.version)
            .map_err(wrap)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    Ok(())
}
