use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::calendar::{CalendarLogic, DayUpdate, parse_break_spec};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::calendar_day::CalendarDay;
use crate::utils::colors::colorize_optional;
use crate::utils::date::parse_date;
use crate::utils::formatting::hours2readable;
use crate::utils::time::{format_optional_time, parse_optional_time};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Day {
        date,
        shift_start,
        shift_end,
        off,
        breaks,
        disable_breaks,
        special,
        no_special,
        sunday_work,
        no_sunday_work,
        reset,
        delete,
    } = cmd
    {
        let date = parse_date(date).ok_or_else(|| AppError::InvalidDate(date.to_string()))?;
        let pool = DbPool::open(&cfg.database)?;

        if *delete {
            return CalendarLogic::delete(&pool, date);
        }

        let update = DayUpdate {
            shift_start: parse_optional_time(shift_start.as_ref())?,
            shift_end: parse_optional_time(shift_end.as_ref())?,
            off: *off,
            breaks: breaks
                .iter()
                .map(|b| parse_break_spec(b))
                .collect::<AppResult<Vec<_>>>()?,
            disable_breaks: disable_breaks.clone(),
            special: special.as_deref().map(parse_break_spec).transpose()?,
            clear_special: *no_special,
            sunday_work: match (*sunday_work, *no_sunday_work) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            reset: *reset,
        };

        let day = CalendarLogic::upsert(&pool, date, &update)?;
        print_day(&day);
    }

    Ok(())
}

fn print_day(day: &CalendarDay) {
    println!();
    println!("📅 {} ({})", day.date, day.day);
    println!(
        "   Shift      : {} → {}",
        colorize_optional(&format_optional_time(day.shift_start)),
        colorize_optional(&format_optional_time(day.shift_end))
    );
    for b in &day.regular_breaks {
        let state = if b.enabled { "on " } else { "off" };
        println!(
            "   [{}] {:<12} {} → {}",
            state,
            b.name,
            format_optional_time(b.start),
            format_optional_time(b.end)
        );
    }
    if day.special_break.enabled {
        println!(
            "   [special] {:<8} {} → {}",
            day.special_break.description,
            format_optional_time(day.special_break.start),
            format_optional_time(day.special_break.end)
        );
    }
    if day.sunday_work {
        println!("   Sunday work: yes");
    }
    println!(
        "   Available  : {}",
        colorize_optional(&hours2readable(day.available_hours))
    );
}
