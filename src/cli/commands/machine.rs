use crate::cli::parser::{Commands, MachineAction};
use crate::config::Config;
use crate::core::machine::{MachineLogic, parse_machine_type};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Machine { action } = cmd {
        let pool = DbPool::open(&cfg.database)?;

        match action {
            MachineAction::Add {
                name,
                kind,
                target_oee,
            } => {
                MachineLogic::add(&pool, name, parse_machine_type(kind)?, *target_oee)?;
            }
            MachineAction::Edit {
                id,
                name,
                kind,
                target_oee,
            } => {
                let kind = kind.as_deref().map(parse_machine_type).transpose()?;
                MachineLogic::edit(&pool, *id, name.as_deref(), kind, *target_oee)?;
            }
            MachineAction::List => list(&pool)?,
            MachineAction::Del { id } => MachineLogic::delete(&pool, *id)?,
        }
    }
    Ok(())
}

fn list(pool: &DbPool) -> AppResult<()> {
    let machines = MachineLogic::list(pool)?;
    if machines.is_empty() {
        info("No machines registered.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::new("ID", 4),
        Column::new("TYPE", 4),
        Column::new("NAME", 24),
        Column::new("TARGET OEE", 10),
    ]);
    for m in machines {
        table.add_row(vec![
            m.id.to_string(),
            m.kind.to_string(),
            m.name,
            format!("{:.1}%", m.target_oee),
        ]);
    }
    print!("{}", table.render());
    Ok(())
}
