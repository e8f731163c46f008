use crate::core::scheduler::CalendarSource;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::calendar_day::{CalendarDay, RegularBreak, SpecialBreak};
use crate::models::job::{JobRecord, ProductionEntry};
use crate::models::machine::Machine;
use crate::models::machine_type::MachineType;
use crate::models::plan::{OperationTimes, ProductionPlan};
use crate::utils::time::{format_time, parse_time_lenient};
use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const DATETIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

fn parse_db_datetime(col: usize, s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FMT)
        .map_err(|_| conversion_error(col, AppError::InvalidDateTime(s.to_string())))
}

fn stored_time(t: Option<chrono::NaiveTime>) -> String {
    t.map(format_time).unwrap_or_default()
}

// ------------------------------------------------------------------
// calendar_days
// ------------------------------------------------------------------

pub fn map_calendar_row(row: &Row) -> Result<CalendarDay> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(0, AppError::InvalidDate(date_str.clone())))?;

    let shift_start: String = row.get("shift_start")?;
    let shift_end: String = row.get("shift_end")?;

    // Damaged break documents fall back to the templates on normalisation.
    let regular_json: String = row.get("regular_breaks")?;
    let regular_breaks: Vec<RegularBreak> =
        serde_json::from_str(&regular_json).unwrap_or_else(|e| {
            tracing::warn!(date = %date_str, error = %e, "unreadable regular breaks");
            Vec::new()
        });

    let special_json: String = row.get("special_break")?;
    let special_break: SpecialBreak =
        serde_json::from_str(&special_json).unwrap_or_else(|e| {
            tracing::warn!(date = %date_str, error = %e, "unreadable special break");
            SpecialBreak::default()
        });

    let day = CalendarDay {
        date,
        day: row.get("day")?,
        shift_start: parse_time_lenient(&shift_start),
        shift_end: parse_time_lenient(&shift_end),
        regular_breaks,
        special_break,
        sunday_work: row.get::<_, i32>("sunday_work")? == 1,
        available_hours: row.get("available_hours")?,
    };

    Ok(day.normalized())
}

/// Every configured day, oldest first, normalised.
pub fn load_calendar(conn: &Connection) -> AppResult<Vec<CalendarDay>> {
    let mut stmt = conn.prepare("SELECT * FROM calendar_days ORDER BY date ASC")?;
    let rows = stmt.query_map([], map_calendar_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_calendar_range(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<CalendarDay>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM calendar_days
         WHERE date BETWEEN ?1 AND ?2
         ORDER BY date ASC",
    )?;
    let rows = stmt.query_map(params![from.to_string(), to.to_string()], map_calendar_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_calendar_day(conn: &Connection, date: NaiveDate) -> AppResult<Option<CalendarDay>> {
    let mut stmt = conn.prepare("SELECT * FROM calendar_days WHERE date = ?1")?;
    let day = stmt
        .query_row([date.to_string()], map_calendar_row)
        .optional()?;
    Ok(day)
}

/// Create-or-update keyed by date. The day is normalised before writing.
pub fn upsert_calendar_day(conn: &Connection, day: &CalendarDay) -> AppResult<CalendarDay> {
    let day = day.clone().normalized();

    conn.execute(
        "INSERT INTO calendar_days
            (date, day, shift_start, shift_end, regular_breaks, special_break,
             sunday_work, available_hours, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(date) DO UPDATE SET
            day = excluded.day,
            shift_start = excluded.shift_start,
            shift_end = excluded.shift_end,
            regular_breaks = excluded.regular_breaks,
            special_break = excluded.special_break,
            sunday_work = excluded.sunday_work,
            available_hours = excluded.available_hours,
            updated_at = excluded.updated_at",
        params![
            day.date.to_string(),
            day.day,
            stored_time(day.shift_start),
            stored_time(day.shift_end),
            serde_json::to_string(&day.regular_breaks)?,
            serde_json::to_string(&day.special_break)?,
            if day.sunday_work { 1 } else { 0 },
            day.available_hours,
            Local::now().to_rfc3339(),
        ],
    )?;

    Ok(day)
}

pub fn delete_calendar_day(conn: &Connection, date: NaiveDate) -> AppResult<usize> {
    let n = conn.execute("DELETE FROM calendar_days WHERE date = ?1", [date.to_string()])?;
    Ok(n)
}

impl CalendarSource for DbPool {
    fn fetch_calendar(&self) -> AppResult<Vec<CalendarDay>> {
        load_calendar(&self.conn)
    }
}

// ------------------------------------------------------------------
// machines
// ------------------------------------------------------------------

pub fn map_machine_row(row: &Row) -> Result<Machine> {
    let kind_str: String = row.get("type")?;
    let kind = MachineType::from_db_str(&kind_str)
        .ok_or_else(|| conversion_error(0, AppError::InvalidMachineType(kind_str.clone())))?;

    Ok(Machine {
        id: row.get("id")?,
        name: row.get("name")?,
        kind,
        target_oee: row.get("target_oee")?,
    })
}

pub fn insert_machine(conn: &Connection, m: &Machine) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO machines (name, type, target_oee, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            m.name,
            m.kind.to_db_str(),
            m.target_oee,
            Local::now().to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_machines(conn: &Connection) -> AppResult<Vec<Machine>> {
    let mut stmt = conn.prepare("SELECT * FROM machines ORDER BY type ASC, name ASC")?;
    let rows = stmt.query_map([], map_machine_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_machine(conn: &Connection, id: i64) -> AppResult<Option<Machine>> {
    let mut stmt = conn.prepare("SELECT * FROM machines WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_machine_row).optional()?)
}

/// Case-insensitive lookup within one machine type.
pub fn find_machine(conn: &Connection, kind: MachineType, name: &str) -> AppResult<Option<Machine>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM machines
         WHERE type = ?1 AND lower(name) = lower(?2)",
    )?;
    Ok(stmt
        .query_row(params![kind.to_db_str(), name.trim()], map_machine_row)
        .optional()?)
}

pub fn update_machine(conn: &Connection, m: &Machine) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE machines SET name = ?1, type = ?2, target_oee = ?3 WHERE id = ?4",
        params![m.name, m.kind.to_db_str(), m.target_oee, m.id],
    )?)
}

pub fn delete_machine(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM machines WHERE id = ?1", [id])?)
}

// ------------------------------------------------------------------
// production_plans
// ------------------------------------------------------------------

pub fn map_plan_row(row: &Row) -> Result<ProductionPlan> {
    let type_str: String = row.get("machine_type")?;
    let machine_type = MachineType::from_db_str(&type_str)
        .ok_or_else(|| conversion_error(0, AppError::InvalidMachineType(type_str.clone())))?;

    let ops_json: String = row.get("operations")?;
    let operations: OperationTimes = serde_json::from_str(&ops_json)
        .map_err(|e| conversion_error(0, AppError::Document(e)))?;

    let start_str: String = row.get("start")?;
    let start = parse_db_datetime(0, &start_str)?;

    let target = |col: &str| -> Result<Option<NaiveDateTime>> {
        match row.get::<_, Option<String>>(col)? {
            Some(s) if !s.is_empty() => parse_db_datetime(0, &s).map(Some),
            _ => Ok(None),
        }
    };

    Ok(ProductionPlan {
        id: row.get("id")?,
        job_card_no: row.get("job_card_no")?,
        part_no: row.get("part_no")?,
        part_name: row.get("part_name")?,
        machine_type,
        machine_no: row.get("machine_no")?,
        plan_qty: row.get("plan_qty")?,
        setup_no: row.get("setup_no")?,
        operations,
        start,
        total_hours: row.get("total_hours")?,
        machine_only_hours: row.get("machine_only_hours")?,
        target_whole_part: target("target_whole_part")?,
        target_machine_only: target("target_machine_only")?,
        working_days: row.get("working_days")?,
        created_at: row.get("created_at")?,
    })
}

fn fmt_target(t: Option<NaiveDateTime>) -> Option<String> {
    t.map(|dt| dt.format(DATETIME_FMT).to_string())
}

pub fn insert_plan(conn: &Connection, p: &ProductionPlan) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO production_plans
            (job_card_no, part_no, part_name, machine_type, machine_no, plan_qty, setup_no,
             operations, start, total_hours, machine_only_hours,
             target_whole_part, target_machine_only, working_days, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            p.job_card_no,
            p.part_no,
            p.part_name,
            p.machine_type.to_db_str(),
            p.machine_no,
            p.plan_qty,
            p.setup_no,
            serde_json::to_string(&p.operations)?,
            p.start.format(DATETIME_FMT).to_string(),
            p.total_hours,
            p.machine_only_hours,
            fmt_target(p.target_whole_part),
            fmt_target(p.target_machine_only),
            p.working_days,
            p.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Persist recomputed hours and projected targets of an existing plan.
pub fn update_plan_schedule(conn: &Connection, p: &ProductionPlan) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE production_plans
         SET total_hours = ?1, machine_only_hours = ?2,
             target_whole_part = ?3, target_machine_only = ?4,
             working_days = ?5
         WHERE job_card_no = ?6",
        params![
            p.total_hours,
            p.machine_only_hours,
            fmt_target(p.target_whole_part),
            fmt_target(p.target_machine_only),
            p.working_days,
            p.job_card_no,
        ],
    )?;
    Ok(n)
}

pub fn load_plans(conn: &Connection) -> AppResult<Vec<ProductionPlan>> {
    let mut stmt = conn.prepare("SELECT * FROM production_plans ORDER BY start ASC, id ASC")?;
    let rows = stmt.query_map([], map_plan_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_plan(conn: &Connection, job_card_no: &str) -> AppResult<Option<ProductionPlan>> {
    let mut stmt = conn.prepare("SELECT * FROM production_plans WHERE job_card_no = ?1")?;
    Ok(stmt
        .query_row([job_card_no.trim()], map_plan_row)
        .optional()?)
}

pub fn plan_with_part_no(conn: &Connection, part_no: &str) -> AppResult<Option<ProductionPlan>> {
    let mut stmt = conn.prepare("SELECT * FROM production_plans WHERE part_no = ?1")?;
    Ok(stmt.query_row([part_no.trim()], map_plan_row).optional()?)
}

pub fn delete_plan(conn: &Connection, job_card_no: &str) -> AppResult<usize> {
    Ok(conn.execute(
        "DELETE FROM production_plans WHERE job_card_no = ?1",
        [job_card_no.trim()],
    )?)
}

// ------------------------------------------------------------------
// jobs
// ------------------------------------------------------------------

pub fn map_job_row(row: &Row) -> Result<JobRecord> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_error(0, AppError::InvalidDate(date_str.clone())))?;

    let entries_json: String = row.get("production_entries")?;
    let entries: Vec<ProductionEntry> = serde_json::from_str(&entries_json)
        .map_err(|e| conversion_error(0, AppError::Document(e)))?;

    Ok(JobRecord {
        id: row.get("id")?,
        date,
        job_no: row.get("job_no")?,
        machine_no: row.get("machine_no")?,
        job_card_no: row.get("job_card_no")?,
        part_name: row.get("part_name")?,
        part_no: row.get("part_no")?,
        op_no: row.get("op_no")?,
        setter: row.get("setter")?,
        lot_qty: row.get("lot_qty")?,
        target_prod: row.get("target_prod")?,
        cycle_time: row.get("cycle_time")?,
        entries,
        created_at: row.get("created_at")?,
    })
}

fn collect_jobs(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> AppResult<Vec<JobRecord>> {
    let rows = stmt.query_map(params, map_job_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_job(conn: &Connection, j: &JobRecord) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO jobs
            (date, job_no, machine_no, job_card_no, part_name, part_no, op_no, setter,
             lot_qty, target_prod, cycle_time, production_entries, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            j.date.format("%Y-%m-%d").to_string(),
            j.job_no,
            j.machine_no,
            j.job_card_no,
            j.part_name,
            j.part_no,
            j.op_no,
            j.setter,
            j.lot_qty,
            j.target_prod,
            j.cycle_time,
            serde_json::to_string(&j.entries)?,
            j.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn load_job(conn: &Connection, id: i64) -> AppResult<Option<JobRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_job_row).optional()?)
}

/// Jobs dated `from..=to`, oldest first.
pub fn load_jobs_range(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<JobRecord>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM jobs WHERE date BETWEEN ?1 AND ?2 ORDER BY date ASC, id ASC",
    )?;
    collect_jobs(
        &mut stmt,
        params![
            from.format("%Y-%m-%d").to_string(),
            to.format("%Y-%m-%d").to_string()
        ],
    )
}

/// Every job logged against a job card (surrounding blanks ignored), newest first.
pub fn load_jobs_by_card(conn: &Connection, job_card_no: &str) -> AppResult<Vec<JobRecord>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM jobs WHERE trim(job_card_no) = ?1 ORDER BY date DESC, id DESC",
    )?;
    collect_jobs(&mut stmt, [job_card_no.trim()])
}

pub fn update_job_entries(conn: &Connection, j: &JobRecord) -> AppResult<usize> {
    Ok(conn.execute(
        "UPDATE jobs SET production_entries = ?1 WHERE id = ?2",
        params![serde_json::to_string(&j.entries)?, j.id],
    )?)
}

pub fn delete_job(conn: &Connection, id: i64) -> AppResult<usize> {
    Ok(conn.execute("DELETE FROM jobs WHERE id = ?1", [id])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;
    use crate::utils::date::parse_date;
    use crate::utils::time::{parse_datetime, parse_time};

    fn memory_pool() -> DbPool {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        DbPool { conn }
    }

    #[test]
    fn calendar_upsert_is_keyed_by_date() {
        let pool = memory_pool();
        let date = parse_date("2025-06-04").unwrap();
        let mut day = CalendarDay::with_defaults(date);
        upsert_calendar_day(&pool.conn, &day).unwrap();

        day.shift_end = parse_time("16:00");
        let stored = upsert_calendar_day(&pool.conn, &day).unwrap();
        // 8h minus morning tea and lunch
        assert_eq!(stored.available_hours, 7.25);

        let all = pool.fetch_calendar().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].shift_end, parse_time("16:00"));
        assert_eq!(all[0].available_hours, 7.25);
    }

    #[test]
    fn stored_day_is_normalised_on_load() {
        let pool = memory_pool();
        pool.conn
            .execute(
                "INSERT INTO calendar_days (date, day, shift_start, shift_end, regular_breaks,
                     special_break, sunday_work, available_hours, updated_at)
                 VALUES ('2025-06-04', 'Sun', '08:00', '20:00', 'not json', '{}', 0, 0, '')",
                [],
            )
            .unwrap();

        let day = load_calendar_day(&pool.conn, parse_date("2025-06-04").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(day.day, "Wed");
        assert_eq!(day.regular_breaks.len(), 3);
        assert_eq!(day.available_hours, 11.0);
    }

    #[test]
    fn unreadable_special_break_loads_as_disabled() {
        let pool = memory_pool();
        pool.conn
            .execute(
                "INSERT INTO calendar_days (date, day, shift_start, shift_end, regular_breaks,
                     special_break, sunday_work, available_hours, updated_at)
                 VALUES ('2025-06-05', 'Thu', '08:00', '20:00', '[]', '{\"enabled\": tru', 0, 0, '')",
                [],
            )
            .unwrap();

        let day = load_calendar_day(&pool.conn, parse_date("2025-06-05").unwrap())
            .unwrap()
            .unwrap();
        assert!(!day.special_break.enabled);
        assert_eq!(day.special_break.window(), None);
        assert_eq!(day.available_hours, 11.0);
    }

    #[test]
    fn unset_shift_round_trips_as_unset() {
        let pool = memory_pool();
        let mut day = CalendarDay::with_defaults(parse_date("2025-12-25").unwrap());
        day.shift_start = None;
        day.shift_end = None;
        upsert_calendar_day(&pool.conn, &day).unwrap();

        let back = load_calendar_day(&pool.conn, day.date).unwrap().unwrap();
        assert_eq!(back.shift_start, None);
        assert_eq!(back.available_hours, 0.0);
    }

    #[test]
    fn machine_names_are_unique_per_type_ignoring_case() {
        let pool = memory_pool();
        insert_machine(&pool.conn, &Machine::new("Lathe-1", MachineType::Cnc, 85.0)).unwrap();

        assert!(find_machine(&pool.conn, MachineType::Cnc, "lathe-1").unwrap().is_some());
        assert!(find_machine(&pool.conn, MachineType::Vmc, "lathe-1").unwrap().is_none());
        assert!(
            insert_machine(&pool.conn, &Machine::new("LATHE-1", MachineType::Cnc, 80.0)).is_err()
        );
    }

    #[test]
    fn jobs_share_a_card_and_report_newest_first() {
        let pool = memory_pool();
        let day = |s: &str| parse_date(s).unwrap();

        let first = JobRecord::new(day("2025-06-02"), "J1", "CNC-01", "JC-7", "Flange");
        let second = JobRecord::new(day("2025-06-03"), "J2", "CNC-01", " JC-7 ", "Flange");
        let other = JobRecord::new(day("2025-06-03"), "J3", "VMC-01", "JC-8", "Cover");
        let first_id = insert_job(&pool.conn, &first).unwrap();
        insert_job(&pool.conn, &second).unwrap();
        insert_job(&pool.conn, &other).unwrap();

        let card: Vec<_> = load_jobs_by_card(&pool.conn, "JC-7")
            .unwrap()
            .into_iter()
            .map(|j| j.job_no)
            .collect();
        assert_eq!(card, vec!["J2", "J1"]);

        let monday = load_jobs_range(&pool.conn, day("2025-06-02"), day("2025-06-02")).unwrap();
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].id, first_id);

        let mut job = load_job(&pool.conn, first_id).unwrap().unwrap();
        job.entries.push(ProductionEntry {
            opr_no: "10".into(),
            actual_prod_qty: 40.0,
            ..ProductionEntry::default()
        });
        assert_eq!(update_job_entries(&pool.conn, &job).unwrap(), 1);
        let back = load_job(&pool.conn, first_id).unwrap().unwrap();
        assert_eq!(back.entries, job.entries);

        assert_eq!(delete_job(&pool.conn, first_id).unwrap(), 1);
        assert!(load_job(&pool.conn, first_id).unwrap().is_none());
    }

    #[test]
    fn plan_round_trips_with_targets() {
        let pool = memory_pool();
        let mut plan = ProductionPlan::new(
            "JC-1",
            "P-1",
            "Flange",
            MachineType::Vmc,
            "VMC-01",
            50.0,
            "S2",
            OperationTimes {
                vmc: 3.0,
                setup: 30.0,
                ..OperationTimes::default()
            },
            parse_datetime("2025-06-02T08:00").unwrap(),
        );
        plan.target_whole_part = Some(parse_datetime("2025-06-02T11:15").unwrap());
        insert_plan(&pool.conn, &plan).unwrap();

        let back = load_plan(&pool.conn, "JC-1").unwrap().unwrap();
        assert_eq!(back.operations, plan.operations);
        assert_eq!(back.target_whole_part, plan.target_whole_part);
        assert_eq!(back.target_machine_only, None);
        assert!(plan_with_part_no(&pool.conn, "P-1").unwrap().is_some());

        assert_eq!(delete_plan(&pool.conn, "JC-1").unwrap(), 1);
        assert!(load_plans(&pool.conn).unwrap().is_empty());
    }
}
