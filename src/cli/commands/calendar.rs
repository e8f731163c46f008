use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::calendar::{CalendarLogic, CalendarRow, DaySource};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::utils::colors::{GREY, RESET, color_for_available, colorize_optional};
use crate::utils::date::{resolve_period, weekday_label};
use crate::utils::formatting::hours2readable;
use crate::utils::table::{Column, Table};
use crate::utils::time::format_time;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Calendar { period } = cmd {
        let dates = resolve_period(period.as_deref()).map_err(AppError::InvalidDate)?;
        let pool = DbPool::open(&cfg.database)?;
        let rows = CalendarLogic::rows(&pool, &dates, &cfg.planner_settings())?;

        print_rows(&rows, &cfg.separator_char);
    }
    Ok(())
}

fn print_rows(rows: &[CalendarRow], separator: &str) {
    let mut table = Table::new(vec![
        Column::new("DATE", 10),
        Column::new("DAY", 3),
        Column::new("SHIFT", 13),
        Column::new("AVAILABLE", 14),
        Column::new("SPECIAL", 24),
        Column::new("SOURCE", 7),
    ]);

    let mut total = 0.0;
    let mut working = 0;
    for row in rows {
        let shift = match row.shift {
            Some((s, e)) => format!("{} - {}", format_time(s), format_time(e)),
            None => "--:--".to_string(),
        };
        let special = row
            .entry
            .as_ref()
            .filter(|d| d.special_break.enabled)
            .map(|d| d.special_break.description.clone())
            .unwrap_or_else(|| "-".to_string());
        let source = match row.source {
            DaySource::Configured => "stored".to_string(),
            DaySource::Default => format!("{GREY}default{RESET}"),
        };

        table.add_row(vec![
            row.date.to_string(),
            weekday_label(row.date).to_string(),
            colorize_optional(&shift),
            format!(
                "{}{}{}",
                color_for_available(row.available_hours),
                hours2readable(row.available_hours),
                RESET
            ),
            colorize_optional(&special),
            source,
        ]);

        total += row.available_hours;
        if row.working {
            working += 1;
        }
    }

    print!("{}", table.render());
    println!("{}", separator.repeat(76));
    println!(
        "{} working day(s) of {}, {} available",
        working,
        rows.len(),
        hours2readable(total)
    );
}
