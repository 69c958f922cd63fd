//! Ordered schema scripts for the booking registry.
//!
//! # Invariants
//! - Versions are strictly increasing.
//! - Pending scripts run in one transaction and bump `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::debug;
use rusqlite::{Connection, Transaction};

/// `(version, script)` pairs, oldest first.
const SCRIPTS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Schema version produced by this build.
pub fn latest_version() -> u32 {
    SCRIPTS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `SchemaTooNew` when the connection is ahead of this build.
/// - `Migration` naming the script that failed; the whole batch rolls back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }

    let pending = SCRIPTS
        .iter()
        .filter(|(version, _)| *version > found)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, script) in pending {
        run_script(&tx, *version, script).map_err(|source| DbError::Migration {
            version: *version,
            source,
        })?;
        debug!("event=db_migrate module=db status=ok version={version}");
    }
    tx.commit()?;
    Ok(())
}

fn run_script(tx: &Transaction<'_>, version: u32, script: &str) -> rusqlite::Result<()> {
    tx.execute_batch(script)?;
    tx.pragma_update(None, "user_version", version)
}
