use crate::cli::parser::{Commands, JobAction};
use crate::config::Config;
use crate::core::job::{EntryInput, JobInput, JobLogic, JobReport, parse_loss_spec};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::job::JobRecord;
use crate::ui::messages::info;
use crate::utils::date::{parse_date, resolve_period};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Job { action } = cmd {
        let pool = DbPool::open(&cfg.database)?;

        match action {
            JobAction::Add {
                date,
                job_no,
                machine_no,
                job_card,
                part_name,
                part_no,
                op_no,
                setter,
                lot_qty,
                target_prod,
                cycle_time,
            } => {
                let input = JobInput {
                    date: Some(
                        parse_date(date).ok_or_else(|| AppError::InvalidDate(date.to_string()))?,
                    ),
                    job_no: job_no.clone(),
                    machine_no: machine_no.clone(),
                    job_card_no: job_card.clone(),
                    part_name: part_name.clone(),
                    part_no: part_no.clone(),
                    op_no: op_no.clone(),
                    setter: setter.clone(),
                    lot_qty: *lot_qty,
                    target_prod: *target_prod,
                    cycle_time: *cycle_time,
                };
                JobLogic::add(&pool, &input)?;
            }
            JobAction::Entry {
                id,
                opr_no,
                target_qty,
                actual_qty,
                rejection_qty,
                cycle_time,
                duration_hrs,
                losses,
                remarks,
            } => {
                let input = EntryInput {
                    opr_no: opr_no.clone(),
                    target_prod_qty: *target_qty,
                    actual_prod_qty: *actual_qty,
                    rejection_qty: *rejection_qty,
                    cycle_time_min: *cycle_time,
                    act_duration_hrs: *duration_hrs,
                    losses: losses
                        .iter()
                        .map(|l| parse_loss_spec(l))
                        .collect::<AppResult<Vec<_>>>()?,
                    remarks: remarks.clone(),
                };
                JobLogic::add_entry(&pool, *id, &input)?;
            }
            JobAction::List { period } => {
                let dates = resolve_period(period.as_deref()).map_err(AppError::InvalidDate)?;
                let (Some(&from), Some(&to)) = (dates.first(), dates.last()) else {
                    info("No jobs recorded.");
                    return Ok(());
                };
                list(&JobLogic::list(&pool, from, to)?, &cfg.separator_char);
            }
            JobAction::Report { job_card } => {
                print_report(&JobLogic::report(&pool, job_card)?, &cfg.separator_char)
            }
            JobAction::Del { id } => JobLogic::delete(&pool, *id)?,
        }
    }
    Ok(())
}

fn job_table(jobs: &[JobRecord]) -> Table {
    let mut table = Table::new(vec![
        Column::new("ID", 4),
        Column::new("DATE", 10),
        Column::new("JOB", 6),
        Column::new("MACHINE", 10),
        Column::new("JOB CARD", 10),
        Column::new("PART", 16),
        Column::new("ENTRIES", 7),
        Column::new("ACTUAL", 8),
        Column::new("REJECTED", 8),
        Column::new("LOSS H", 6),
    ]);
    for j in jobs {
        table.add_row(vec![
            j.id.to_string(),
            j.date.to_string(),
            j.job_no.clone(),
            j.machine_no.clone(),
            j.job_card_no.clone(),
            j.part_name.clone(),
            j.entries.len().to_string(),
            format!("{}", j.actual_qty()),
            format!("{}", j.rejection_qty()),
            format!("{:.2}", j.loss_hours()),
        ]);
    }
    table
}

fn list(jobs: &[JobRecord], separator: &str) {
    if jobs.is_empty() {
        info("No jobs recorded.");
        return;
    }
    print!("{}", job_table(jobs).render());
    println!("{}", separator.repeat(100));
    println!("{} job(s)", jobs.len());
}

fn print_report(report: &JobReport, separator: &str) {
    if report.jobs.is_empty() {
        info(format!("No jobs recorded for job card {}.", report.job_card_no));
        return;
    }

    println!();
    println!("🧾 Job card {}", report.job_card_no);
    print!("{}", job_table(&report.jobs).render());

    for job in &report.jobs {
        for (n, e) in job.entries.iter().enumerate() {
            let losses = e
                .losses
                .iter()
                .map(|(kind, h)| format!("{kind} {h:.2} h"))
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "   #{} {} entry {}: opr {} actual {} rejected {}{}{}",
                job.id,
                job.date,
                n + 1,
                e.opr_no,
                e.actual_prod_qty,
                e.rejection_qty,
                if losses.is_empty() { String::new() } else { format!(" [{losses}]") },
                if e.remarks.is_empty() { String::new() } else { format!(" {}", e.remarks) },
            );
        }
    }

    println!("{}", separator.repeat(100));
    println!(
        "Totals: actual {}, rejected {}, loss {:.2} h over {} job(s)",
        report.actual_qty,
        report.rejection_qty,
        report.loss_hours,
        report.jobs.len()
    );
}
