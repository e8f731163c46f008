use crate::db::log::{LogOp, ttlog_quiet};
use crate::db::pool::DbPool;
use crate::db::queries::{
    delete_job, insert_job, load_job, load_jobs_by_card, load_jobs_range, update_job_entries,
};
use crate::errors::{AppError, AppResult};
use crate::models::job::{JobRecord, LossKind, ProductionEntry};
use crate::ui::messages::success;
use crate::utils::time::round_hours;
use chrono::NaiveDate;

/// Quantities, times and durations are never negative.
pub fn validate_quantity(field: &'static str, value: f64) -> AppResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AppError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    }
}

/// `KIND=HOURS` → (kind, hours).
pub fn parse_loss_spec(spec: &str) -> AppResult<(LossKind, f64)> {
    let invalid = || AppError::InvalidLoss(spec.to_string());

    let (kind, hours) = spec.split_once('=').ok_or_else(invalid)?;
    let kind = LossKind::from_code(kind).ok_or_else(invalid)?;
    let hours: f64 = hours.trim().parse().map_err(|_| invalid())?;
    if !hours.is_finite() || hours < 0.0 {
        return Err(invalid());
    }

    Ok((kind, hours))
}

/// Header of a job as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct JobInput {
    pub date: Option<NaiveDate>,
    pub job_no: String,
    pub machine_no: String,
    pub job_card_no: String,
    pub part_name: String,
    pub part_no: String,
    pub op_no: String,
    pub setter: String,
    pub lot_qty: f64,
    pub target_prod: f64,
    pub cycle_time: f64,
}

impl JobInput {
    pub fn validate(&self) -> AppResult<JobRecord> {
        let date = self
            .date
            .ok_or_else(|| AppError::InvalidDate("missing job date".into()))?;

        for (field, value) in [
            ("job number", &self.job_no),
            ("machine number", &self.machine_no),
            ("job card number", &self.job_card_no),
            ("part name", &self.part_name),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Other(format!("{field} must not be empty")));
            }
        }

        let mut job = JobRecord::new(
            date,
            &self.job_no,
            &self.machine_no,
            &self.job_card_no,
            &self.part_name,
        );
        job.part_no = self.part_no.trim().to_string();
        job.op_no = self.op_no.trim().to_string();
        job.setter = self.setter.trim().to_string();
        job.lot_qty = validate_quantity("lot quantity", self.lot_qty)?;
        job.target_prod = validate_quantity("target production", self.target_prod)?;
        job.cycle_time = validate_quantity("cycle time", self.cycle_time)?;
        Ok(job)
    }
}

/// One production entry as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct EntryInput {
    pub opr_no: String,
    pub target_prod_qty: f64,
    pub actual_prod_qty: f64,
    pub rejection_qty: f64,
    pub cycle_time_min: f64,
    pub act_duration_hrs: f64,
    pub losses: Vec<(LossKind, f64)>,
    pub remarks: String,
}

impl EntryInput {
    /// Repeated loss kinds add up.
    pub fn validate(&self) -> AppResult<ProductionEntry> {
        let mut entry = ProductionEntry {
            opr_no: self.opr_no.trim().to_string(),
            target_prod_qty: validate_quantity("target quantity", self.target_prod_qty)?,
            actual_prod_qty: validate_quantity("actual quantity", self.actual_prod_qty)?,
            rejection_qty: validate_quantity("rejection quantity", self.rejection_qty)?,
            cycle_time_min: validate_quantity("cycle time", self.cycle_time_min)?,
            act_duration_hrs: validate_quantity("duration", self.act_duration_hrs)?,
            remarks: self.remarks.trim().to_string(),
            ..ProductionEntry::default()
        };

        for &(kind, hours) in &self.losses {
            let total = entry.losses.entry(kind).or_insert(0.0);
            *total = round_hours(*total + validate_quantity("loss hours", hours)?);
        }
        Ok(entry)
    }
}

/// Every job logged against one job card, with totals over all entries.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub job_card_no: String,
    pub jobs: Vec<JobRecord>,
    pub actual_qty: f64,
    pub rejection_qty: f64,
    pub loss_hours: f64,
}

impl JobReport {
    pub fn from_jobs(job_card_no: &str, jobs: Vec<JobRecord>) -> Self {
        let actual_qty = jobs.iter().map(JobRecord::actual_qty).sum();
        let rejection_qty = jobs.iter().map(JobRecord::rejection_qty).sum();
        let loss_hours = round_hours(jobs.iter().map(JobRecord::loss_hours).sum());
        Self {
            job_card_no: job_card_no.trim().to_string(),
            jobs,
            actual_qty,
            rejection_qty,
            loss_hours,
        }
    }
}

pub struct JobLogic;

impl JobLogic {
    pub fn add(pool: &DbPool, input: &JobInput) -> AppResult<JobRecord> {
        let mut job = input.validate()?;
        job.id = insert_job(&pool.conn, &job)?;

        ttlog_quiet(
            &pool.conn,
            LogOp::Add,
            &format!("job {}", job.id),
            &format!(
                "{} {} on {} ({})",
                job.job_card_no, job.part_name, job.machine_no, job.date
            ),
        );
        success(format!(
            "Job #{} added: {} on {} ({})",
            job.id, job.job_card_no, job.machine_no, job.date
        ));
        Ok(job)
    }

    pub fn add_entry(pool: &DbPool, id: i64, input: &EntryInput) -> AppResult<JobRecord> {
        let mut job = load_job(&pool.conn, id)?.ok_or(AppError::JobNotFound(id))?;
        let entry = input.validate()?;
        let summary = format!(
            "opr {} actual {} rejected {} loss {:.2} h",
            entry.opr_no,
            entry.actual_prod_qty,
            entry.rejection_qty,
            entry.total_loss_hours()
        );
        job.entries.push(entry);

        update_job_entries(&pool.conn, &job)?;
        ttlog_quiet(&pool.conn, LogOp::Edit, &format!("job {}", id), &summary);
        success(format!(
            "Production entry {} added to job #{}",
            job.entries.len(),
            id
        ));
        Ok(job)
    }

    pub fn list(pool: &DbPool, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<JobRecord>> {
        load_jobs_range(&pool.conn, from, to)
    }

    pub fn report(pool: &DbPool, job_card_no: &str) -> AppResult<JobReport> {
        let jobs = load_jobs_by_card(&pool.conn, job_card_no)?;
        Ok(JobReport::from_jobs(job_card_no, jobs))
    }

    pub fn delete(pool: &DbPool, id: i64) -> AppResult<()> {
        let job = load_job(&pool.conn, id)?.ok_or(AppError::JobNotFound(id))?;
        delete_job(&pool.conn, id)?;

        ttlog_quiet(
            &pool.conn,
            LogOp::Del,
            &format!("job {}", id),
            &format!(
                "Job deleted: {} {} ({} entries)",
                job.job_card_no,
                job.date,
                job.entries.len()
            ),
        );
        success(format!("Job #{} deleted", id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;
    use crate::utils::date::parse_date;
    use rusqlite::Connection;

    fn pool() -> DbPool {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        DbPool { conn }
    }

    fn input(date: &str, job_no: &str) -> JobInput {
        JobInput {
            date: parse_date(date),
            job_no: job_no.into(),
            machine_no: "CNC-01".into(),
            job_card_no: "JC-7".into(),
            part_name: "Flange".into(),
            lot_qty: 200.0,
            ..JobInput::default()
        }
    }

    #[test]
    fn loss_spec_parses_kind_and_hours() {
        assert_eq!(
            parse_loss_spec("tool-change=0.5").unwrap(),
            (LossKind::ToolChange, 0.5)
        );
        for bad in ["power_cut", "coffee=1", "power_cut=-1", "power_cut=abc", "qc_check=inf"] {
            assert!(parse_loss_spec(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn required_header_fields_are_checked() {
        let mut missing_card = input("2025-06-02", "J1");
        missing_card.job_card_no = "  ".into();
        assert!(missing_card.validate().is_err());

        let mut negative = input("2025-06-02", "J1");
        negative.lot_qty = -5.0;
        assert!(matches!(
            negative.validate(),
            Err(AppError::InvalidNumber { field: "lot quantity", .. })
        ));
    }

    #[test]
    fn repeated_loss_kinds_add_up() {
        let entry = EntryInput {
            losses: vec![
                (LossKind::PowerCut, 0.25),
                (LossKind::QcCheck, 0.1),
                (LossKind::PowerCut, 0.5),
            ],
            ..EntryInput::default()
        }
        .validate()
        .unwrap();
        assert_eq!(entry.losses[&LossKind::PowerCut], 0.75);
        assert_eq!(entry.total_loss_hours(), 0.85);
    }

    #[test]
    fn report_totals_cover_every_day_of_the_card() {
        let pool = pool();
        let monday = JobLogic::add(&pool, &input("2025-06-02", "J1")).unwrap();
        let tuesday = JobLogic::add(&pool, &input("2025-06-03", "J2")).unwrap();

        for (id, actual, rejected) in [(monday.id, 90.0, 2.0), (tuesday.id, 85.0, 1.0)] {
            let entry = EntryInput {
                opr_no: "10".into(),
                actual_prod_qty: actual,
                rejection_qty: rejected,
                losses: vec![(LossKind::ToolChange, 0.25)],
                ..EntryInput::default()
            };
            JobLogic::add_entry(&pool, id, &entry).unwrap();
        }

        let report = JobLogic::report(&pool, " JC-7 ").unwrap();
        assert_eq!(report.jobs.len(), 2);
        assert_eq!(report.jobs[0].id, tuesday.id);
        assert_eq!(report.actual_qty, 175.0);
        assert_eq!(report.rejection_qty, 3.0);
        assert_eq!(report.loss_hours, 0.5);

        assert!(JobLogic::report(&pool, "jc-7").unwrap().jobs.is_empty());
    }

    #[test]
    fn delete_is_audited_and_unknown_ids_fail() {
        let pool = pool();
        let job = JobLogic::add(&pool, &input("2025-06-02", "J1")).unwrap();
        JobLogic::delete(&pool, job.id).unwrap();

        let n: i64 = pool
            .conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'del' AND target = ?1",
                [format!("job {}", job.id)],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(n, 1);

        assert!(matches!(
            JobLogic::delete(&pool, job.id),
            Err(AppError::JobNotFound(_))
        ));
        assert!(matches!(
            JobLogic::add_entry(&pool, 99, &EntryInput::default()),
            Err(AppError::JobNotFound(99))
        ));
    }
}
