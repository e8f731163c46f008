use crate::cli::parser::{Commands, PlanAction};
use crate::config::Config;
use crate::core::machine::parse_machine_type;
use crate::core::plan::{PlanInput, PlanLogic};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::plan::{OperationTimes, ProductionPlan};
use crate::ui::messages::info;
use crate::utils::colors::colorize_optional;
use crate::utils::formatting::hours2readable;
use crate::utils::table::{Column, Table};
use crate::utils::time::{format_datetime, parse_datetime};
use chrono::{Local, NaiveDateTime};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Plan { action } = cmd {
        let pool = DbPool::open(&cfg.database)?;
        let settings = cfg.planner_settings();
        let now = Local::now().naive_local();

        match action {
            PlanAction::Add {
                job_card,
                part_no,
                part_name,
                kind,
                machine_no,
                qty,
                setup_no,
                start,
                cnc,
                vmc,
                load_unload,
                conv,
                deburr,
                sandblast,
                setup,
            } => {
                let input = PlanInput {
                    job_card_no: job_card.clone(),
                    part_no: part_no.clone(),
                    part_name: part_name.clone(),
                    machine_type: parse_machine_type(kind)?,
                    machine_no: machine_no.clone(),
                    plan_qty: *qty,
                    setup_no: setup_no.clone(),
                    operations: OperationTimes {
                        cnc: *cnc,
                        vmc: *vmc,
                        load_unload: *load_unload,
                        conv: *conv,
                        deburr: *deburr,
                        sandblast: *sandblast,
                        setup: *setup,
                    },
                    start: parse_datetime(start)?,
                };
                let plan = PlanLogic::add(&pool, input, settings, now)?;
                print_targets(&plan);
            }
            PlanAction::List => list(&pool, &cfg.separator_char)?,
            PlanAction::Del { job_card } => PlanLogic::delete(&pool, job_card)?,
            PlanAction::Refresh { job_card, all } => {
                let plans = match job_card {
                    Some(jc) if !*all => vec![PlanLogic::refresh(&pool, jc, settings, now)?],
                    _ => PlanLogic::refresh_all(&pool, settings, now)?,
                };
                if plans.is_empty() {
                    info("No production plans to refresh.");
                }
                for plan in &plans {
                    print_targets(plan);
                }
            }
        }
    }
    Ok(())
}

fn target(t: Option<NaiveDateTime>) -> String {
    colorize_optional(&t.map(format_datetime).unwrap_or_else(|| "-".to_string()))
}

fn print_targets(plan: &ProductionPlan) {
    println!();
    println!("🧾 {} ({} {})", plan.job_card_no, plan.part_no, plan.machine_type);
    println!(
        "   Whole part   : {} → {}",
        hours2readable(plan.total_hours),
        target(plan.target_whole_part)
    );
    println!(
        "   Machine only : {} → {}",
        hours2readable(plan.machine_only_hours),
        target(plan.target_machine_only)
    );
    println!("   Working days : {}", plan.working_days);
}

fn list(pool: &DbPool, separator: &str) -> AppResult<()> {
    let plans = PlanLogic::list(pool)?;
    if plans.is_empty() {
        info("No production plans recorded.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::new("JOB CARD", 10),
        Column::new("PART", 10),
        Column::new("TYPE", 4),
        Column::new("QTY", 6),
        Column::new("START", 16),
        Column::new("HOURS", 6),
        Column::new("TARGET", 16),
        Column::new("MACHINE", 16),
        Column::new("DAYS", 4),
    ]);
    for p in &plans {
        table.add_row(vec![
            p.job_card_no.clone(),
            p.part_no.clone(),
            p.machine_type.to_string(),
            format!("{}", p.plan_qty),
            format_datetime(p.start),
            format!("{:.2}", p.total_hours),
            target(p.target_whole_part),
            target(p.target_machine_only),
            p.working_days.to_string(),
        ]);
    }
    print!("{}", table.render());
    println!("{}", separator.repeat(100));
    println!("{} plan(s)", plans.len());
    Ok(())
}
