//! Audit trail of every mutation, stored in the `log` table.

use crate::errors::AppResult;
use chrono::Local;
use rusqlite::{Connection, params};

/// Kind of change recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOp {
    Init,
    Add,
    Edit,
    Del,
}

impl LogOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOp::Init => "init",
            LogOp::Add => "add",
            LogOp::Edit => "edit",
            LogOp::Del => "del",
        }
    }
}

pub fn ttlog(conn: &Connection, op: LogOp, target: &str, message: &str) -> AppResult<()> {
    conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![
        Local::now().to_rfc3339(),
        op.as_str(),
        target.trim(),
        message
    ])?;
    Ok(())
}

/// Like [`ttlog`], but a failure only produces a warning: the audit trail
/// never undoes a mutation that already succeeded.
pub fn ttlog_quiet(conn: &Connection, op: LogOp, target: &str, message: &str) {
    if let Err(e) = ttlog(conn, op, target, message) {
        tracing::warn!(
            error = %e,
            operation = op.as_str(),
            log_target = target,
            "failed to write internal log"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;

    #[test]
    fn quiet_log_survives_a_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        ttlog_quiet(&conn, LogOp::Add, "machine 1", "no table yet");
        assert!(ttlog(&conn, LogOp::Add, "machine 1", "no table yet").is_err());

        run_pending_migrations(&conn).unwrap();
        ttlog(&conn, LogOp::Edit, " plan JC-1 ", "ok").unwrap();
        let target: String = conn
            .query_row(
                "SELECT target FROM log WHERE operation = 'edit'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(target, "plan JC-1");
    }
}
