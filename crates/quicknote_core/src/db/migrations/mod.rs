//! Ordered schema steps for the note database.
//!
//! The applied step is recorded in `PRAGMA user_version`. Steps are only
//! ever appended; an existing step's SQL never changes once released.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

struct Step {
    version: u32,
    sql: &'static str,
}

const STEPS: &[Step] = &[Step {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Schema version this build migrates to.
pub fn target_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings `conn` up to [`target_version`] and returns the version it started at.
///
/// The outstanding steps share one transaction, so a failure at any step
/// leaves both tables and `user_version` as they were.
pub fn migrate(conn: &mut Connection) -> DbResult<u32> {
    let found = schema_version(conn)?;
    let target = target_version();
    if found > target {
        return Err(DbError::SchemaTooNew {
            found,
            supported: target,
        });
    }
    if found == target {
        return Ok(found);
    }

    let tx = conn.transaction()?;
    for step in STEPS.iter().skip_while(|step| step.version <= found) {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::MigrationFailed {
                version: step.version,
                source,
            })?;
        debug!("event=db_migrate_step module=db status=ok version={}", step.version);
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={target}");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::STEPS;

    #[test]
    fn step_versions_start_at_one_and_increase_by_one() {
        for (index, step) in STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1);
        }
    }
}
