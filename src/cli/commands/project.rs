use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::scheduler::{ProjectionOutcome, Projector};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use crate::utils::time::parse_datetime;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Project { start, hours } = cmd {
        if !hours.is_finite() {
            return Err(AppError::InvalidNumber {
                field: "hours",
                value: hours.to_string(),
            });
        }
        let start = parse_datetime(start)?;
        let pool = DbPool::open(&cfg.database)?;

        let projector = Projector::new(&pool, cfg.planner_settings());
        let outcome = projector.project(start, *hours);

        match outcome {
            ProjectionOutcome::Computed(_) => {}
            ProjectionOutcome::Fallback(_) => warning(format!(
                "Calendar unavailable, estimated at {} h/day",
                projector.settings().fallback_hours_per_day
            )),
            ProjectionOutcome::Sentinel(_) => warning("No working time found in the calendar"),
        }
        println!("{}: {}", outcome.label(), outcome.to_iso());
    }
    Ok(())
}
