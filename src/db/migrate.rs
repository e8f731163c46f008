use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result, params};

/// One forward-only schema step, identified by a sortable version string.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250601_0001_create_calendar_days",
        description: "Created calendar_days table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS calendar_days (
            date            TEXT PRIMARY KEY,
            day             TEXT NOT NULL DEFAULT '',
            shift_start     TEXT NOT NULL DEFAULT '',
            shift_end       TEXT NOT NULL DEFAULT '',
            regular_breaks  TEXT NOT NULL DEFAULT '[]',
            special_break   TEXT NOT NULL DEFAULT '{}',
            sunday_work     INTEGER NOT NULL DEFAULT 0,
            available_hours REAL NOT NULL DEFAULT 0,
            updated_at      TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250601_0002_create_machines",
        description: "Created machines table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS machines (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            type       TEXT NOT NULL CHECK(type IN ('CNC','VMC')),
            target_oee REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_machines_type_name
            ON machines(type, name COLLATE NOCASE);
        "#,
    },
    Migration {
        version: "20250601_0003_create_production_plans",
        description: "Created production_plans table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS production_plans (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            job_card_no         TEXT NOT NULL UNIQUE,
            part_no             TEXT NOT NULL UNIQUE,
            part_name           TEXT NOT NULL DEFAULT '',
            machine_type        TEXT NOT NULL CHECK(machine_type IN ('CNC','VMC')),
            machine_no          TEXT NOT NULL DEFAULT '',
            plan_qty            REAL NOT NULL DEFAULT 0,
            setup_no            TEXT NOT NULL DEFAULT '',
            operations          TEXT NOT NULL DEFAULT '{}',
            start               TEXT NOT NULL,
            total_hours         REAL NOT NULL DEFAULT 0,
            machine_only_hours  REAL NOT NULL DEFAULT 0,
            target_whole_part   TEXT,
            target_machine_only TEXT,
            working_days        INTEGER NOT NULL DEFAULT 0,
            created_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_plans_start ON production_plans(start);
        "#,
    },
    Migration {
        version: "20250601_0004_create_jobs",
        description: "Created jobs table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            date               TEXT NOT NULL,
            job_no             TEXT NOT NULL,
            machine_no         TEXT NOT NULL,
            job_card_no        TEXT NOT NULL,
            part_name          TEXT NOT NULL,
            part_no            TEXT NOT NULL DEFAULT '',
            op_no              TEXT NOT NULL DEFAULT '',
            setter             TEXT NOT NULL DEFAULT '',
            lot_qty            REAL NOT NULL DEFAULT 0,
            target_prod        REAL NOT NULL DEFAULT 0,
            cycle_time         REAL NOT NULL DEFAULT 0,
            production_entries TEXT NOT NULL DEFAULT '[]',
            created_at         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_jobs_date ON jobs(date);
        CREATE INDEX IF NOT EXISTS idx_jobs_job_card_no ON jobs(job_card_no);
        "#,
    },
];

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare("SELECT 1 FROM schema_migrations WHERE version = ?1 LIMIT 1")?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, datetime('now'))",
        [m.version],
    )?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        params![m.version, m.description],
    )?;

    tx.commit()?;
    Ok(())
}

/// Versions already recorded in `schema_migrations`, oldest first.
pub fn applied_versions(conn: &Connection) -> AppResult<Vec<String>> {
    ensure_migrations_table(conn)?;
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Public entry point: run all pending migrations, returning how many ran.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;
    ensure_migrations_table(conn)?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        success(format!("Migration applied: {} → {}", m.version, m.description));
        applied += 1;
    }

    Ok(applied)
}
