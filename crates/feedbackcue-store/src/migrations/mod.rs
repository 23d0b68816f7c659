//! Schema migrations, tracked in `PRAGMA user_version`.
//!
//! Each step runs in its own transaction together with the version bump, so
//! a failed step leaves the database at the previous version.

pub mod v001_initial;

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// Ordered steps; the position in this list is the version it produces.
const STEPS: &[(&str, Step)] = &[("v001_initial", v001_initial::up)];

/// Schema version after every step has run.
pub const CURRENT_VERSION: u32 = STEPS.len() as u32;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if found > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema v{found} is newer than this build (v{CURRENT_VERSION})"
        )));
    }
    if found == CURRENT_VERSION {
        tracing::debug!(version = found, "schema up to date");
        return Ok(());
    }

    for (index, (name, step)) in STEPS.iter().enumerate().skip(found as usize) {
        let version = index as u32 + 1;
        tracing::info!(version, name, "applying migration");

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        step(&tx).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
    }

    Ok(())
}
