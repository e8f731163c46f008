use crate::core::scheduler::{
    CalendarSource, PlanProjection, PlannerSettings, ProjectionOutcome, Projector,
};
use crate::db::log::{LogOp, ttlog_quiet};
use crate::db::pool::DbPool;
use crate::db::queries::{
    delete_plan, insert_plan, load_plan, load_plans, plan_with_part_no, update_plan_schedule,
};
use crate::errors::{AppError, AppResult};
use crate::models::machine_type::MachineType;
use crate::models::plan::{OperationTimes, ProductionPlan};
use crate::ui::messages::{success, warning};
use chrono::NaiveDateTime;

/// Everything needed to record a new production plan.
#[derive(Debug, Clone)]
pub struct PlanInput {
    pub job_card_no: String,
    pub part_no: String,
    pub part_name: String,
    pub machine_type: MachineType,
    pub machine_no: String,
    pub plan_qty: f64,
    pub setup_no: String,
    pub operations: OperationTimes,
    pub start: NaiveDateTime,
}

fn non_negative(field: &'static str, value: f64) -> AppResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    }
}

impl PlanInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.job_card_no.trim().is_empty() {
            return Err(AppError::Other("job card number must not be empty".into()));
        }
        if self.part_no.trim().is_empty() {
            return Err(AppError::Other("part number must not be empty".into()));
        }

        let ops = &self.operations;
        for (field, value) in [
            ("quantity", self.plan_qty),
            ("CNC time", ops.cnc),
            ("VMC time", ops.vmc),
            ("load/unload time", ops.load_unload),
            ("conventional time", ops.conv),
            ("deburr time", ops.deburr),
            ("sandblast time", ops.sandblast),
            ("setup time", ops.setup),
        ] {
            non_negative(field, value)?;
        }
        Ok(())
    }

    fn into_plan(self) -> ProductionPlan {
        ProductionPlan::new(
            &self.job_card_no,
            &self.part_no,
            &self.part_name,
            self.machine_type,
            &self.machine_no,
            self.plan_qty,
            &self.setup_no,
            self.operations,
            self.start,
        )
    }
}

/// Recompute hours and both targets of `plan` against the calendar in `source`.
pub fn schedule_plan<S: CalendarSource + ?Sized>(
    plan: &mut ProductionPlan,
    source: &S,
    settings: PlannerSettings,
    now: NaiveDateTime,
) -> PlanProjection {
    plan.recompute_hours();

    let projection = Projector::new(source, settings).project_plan(plan, now);
    plan.target_whole_part = projection.whole_part.map(|o| o.timestamp());
    plan.target_machine_only = projection.machine_only.map(|o| o.timestamp());
    plan.working_days = projection.working_days;
    projection
}

/// Tell the user when a target is an estimate rather than a calendar walk.
pub fn report_degraded(
    job_card_no: &str,
    projection: &PlanProjection,
    settings: &PlannerSettings,
) {
    let outcomes = [projection.whole_part, projection.machine_only];
    if outcomes
        .iter()
        .flatten()
        .any(|o| matches!(o, ProjectionOutcome::Fallback(_)))
    {
        warning(format!(
            "{}: calendar unavailable, targets estimated at {} h/day",
            job_card_no, settings.fallback_hours_per_day
        ));
    }
    if outcomes
        .iter()
        .flatten()
        .any(|o| matches!(o, ProjectionOutcome::Sentinel(_)))
    {
        warning(format!(
            "{}: no working time found in the calendar, target set far in the future",
            job_card_no
        ));
    }
}

pub struct PlanLogic;

impl PlanLogic {
    pub fn add(
        pool: &DbPool,
        input: PlanInput,
        settings: PlannerSettings,
        now: NaiveDateTime,
    ) -> AppResult<ProductionPlan> {
        input.validate()?;

        if load_plan(&pool.conn, &input.job_card_no)?.is_some() {
            return Err(AppError::DuplicatePlan(format!(
                "Job card {}",
                input.job_card_no.trim()
            )));
        }
        if plan_with_part_no(&pool.conn, &input.part_no)?.is_some() {
            return Err(AppError::DuplicatePlan(format!(
                "Part number {}",
                input.part_no.trim()
            )));
        }

        let mut plan = input.into_plan();
        let projection = schedule_plan(&mut plan, pool, settings, now);
        plan.id = insert_plan(&pool.conn, &plan)?;

        ttlog_quiet(
            &pool.conn,
            LogOp::Add,
            &format!("plan {}", plan.job_card_no),
            &format!(
                "{} h whole part, {} h machine only",
                plan.total_hours, plan.machine_only_hours
            ),
        );
        report_degraded(&plan.job_card_no, &projection, &settings);
        success(format!("Production plan {} saved", plan.job_card_no));

        Ok(plan)
    }

    /// Re-project one plan against the current calendar.
    pub fn refresh(
        pool: &DbPool,
        job_card_no: &str,
        settings: PlannerSettings,
        now: NaiveDateTime,
    ) -> AppResult<ProductionPlan> {
        let mut plan = load_plan(&pool.conn, job_card_no)?
            .ok_or_else(|| AppError::PlanNotFound(job_card_no.to_string()))?;

        let projection = schedule_plan(&mut plan, pool, settings, now);
        update_plan_schedule(&pool.conn, &plan)?;

        ttlog_quiet(
            &pool.conn,
            LogOp::Edit,
            &format!("plan {}", plan.job_card_no),
            "Targets re-projected",
        );
        report_degraded(&plan.job_card_no, &projection, &settings);
        Ok(plan)
    }

    pub fn refresh_all(
        pool: &DbPool,
        settings: PlannerSettings,
        now: NaiveDateTime,
    ) -> AppResult<Vec<ProductionPlan>> {
        let mut out = Vec::new();
        for plan in load_plans(&pool.conn)? {
            out.push(Self::refresh(pool, &plan.job_card_no, settings, now)?);
        }
        Ok(out)
    }

    pub fn list(pool: &DbPool) -> AppResult<Vec<ProductionPlan>> {
        load_plans(&pool.conn)
    }

    pub fn delete(pool: &DbPool, job_card_no: &str) -> AppResult<()> {
        if delete_plan(&pool.conn, job_card_no)? == 0 {
            return Err(AppError::PlanNotFound(job_card_no.to_string()));
        }
        ttlog_quiet(
            &pool.conn,
            LogOp::Del,
            &format!("plan {}", job_card_no.trim()),
            "Production plan deleted",
        );
        success(format!("Production plan {} deleted", job_card_no.trim()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;
    use crate::db::queries::upsert_calendar_day;
    use crate::models::calendar_day::CalendarDay;
    use crate::utils::date::parse_date;
    use crate::utils::time::{parse_datetime, parse_time};
    use rusqlite::Connection;

    fn pool() -> DbPool {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        DbPool { conn }
    }

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn input(job: &str, part: &str) -> PlanInput {
        PlanInput {
            job_card_no: job.into(),
            part_no: part.into(),
            part_name: "Bracket".into(),
            machine_type: MachineType::Cnc,
            machine_no: "CNC-01".into(),
            plan_qty: 60.0,
            setup_no: "S1".into(),
            operations: OperationTimes {
                cnc: 4.0,
                load_unload: 1.0,
                deburr: 5.0,
                ..OperationTimes::default()
            },
            start: at("2025-06-02T08:00"),
        }
    }

    #[test]
    fn add_projects_both_targets() {
        let pool = pool();
        // whole: 10 * 60 = 600 min = 10h, machine: 5 * 60 = 300 min = 5h
        let now = at("2025-06-01T12:00");
        let plan =
            PlanLogic::add(&pool, input("JC-1", "P-1"), PlannerSettings::default(), now).unwrap();
        assert_eq!(plan.total_hours, 10.0);
        assert_eq!(plan.machine_only_hours, 5.0);
        assert_eq!(plan.target_machine_only, Some(at("2025-06-02T13:45")));
        // 10h: 08:00 + 600 working minutes + 60 minutes of breaks
        assert_eq!(plan.target_whole_part, Some(at("2025-06-02T19:00")));
        assert_eq!(plan.working_days, 1);

        let stored = load_plan(&pool.conn, "JC-1").unwrap().unwrap();
        assert_eq!(stored.target_whole_part, plan.target_whole_part);
    }

    #[test]
    fn duplicate_job_card_or_part_is_rejected() {
        let pool = pool();
        let now = at("2025-06-01T12:00");
        PlanLogic::add(&pool, input("JC-1", "P-1"), PlannerSettings::default(), now).unwrap();
        let settings = PlannerSettings::default();
        assert!(PlanLogic::add(&pool, input("JC-1", "P-2"), settings, now).is_err());
        assert!(PlanLogic::add(&pool, input("JC-2", "P-1"), settings, now).is_err());
    }

    #[test]
    fn negative_times_are_rejected() {
        let mut bad = input("JC-1", "P-1");
        bad.operations.deburr = -1.0;
        assert!(matches!(
            bad.validate(),
            Err(AppError::InvalidNumber { field: "deburr time", .. })
        ));
    }

    #[test]
    fn refresh_follows_calendar_changes() {
        let pool = pool();
        let now = at("2025-06-01T12:00");
        PlanLogic::add(&pool, input("JC-1", "P-1"), PlannerSettings::default(), now).unwrap();

        let mut short = CalendarDay::with_defaults(parse_date("2025-06-02").unwrap());
        short.shift_end = parse_time("12:00");
        upsert_calendar_day(&pool.conn, &short).unwrap();

        let plan = PlanLogic::refresh(&pool, "JC-1", PlannerSettings::default(), now).unwrap();
        // day 1 now only has 3h45 of work
        assert_eq!(plan.target_whole_part.unwrap().date(), parse_date("2025-06-03").unwrap());
        assert_eq!(plan.working_days, 2);
    }

    #[test]
    fn unknown_plan_cannot_be_deleted() {
        let pool = pool();
        assert!(matches!(
            PlanLogic::delete(&pool, "nope"),
            Err(AppError::PlanNotFound(_))
        ));
    }
}
