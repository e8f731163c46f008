use crate::db::log::{LogOp, ttlog_quiet};
use crate::db::pool::DbPool;
use crate::db::queries::{
    delete_machine, find_machine, insert_machine, load_machine, load_machines, update_machine,
};
use crate::errors::{AppError, AppResult};
use crate::models::machine::Machine;
use crate::models::machine_type::MachineType;
use crate::ui::messages::success;

/// Target OEE is a percentage.
pub fn validate_oee(value: f64) -> AppResult<f64> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(AppError::InvalidNumber {
            field: "target OEE",
            value: value.to_string(),
        })
    }
}

pub fn parse_machine_type(code: &str) -> AppResult<MachineType> {
    MachineType::from_code(code).ok_or_else(|| AppError::InvalidMachineType(code.to_string()))
}

pub struct MachineLogic;

impl MachineLogic {
    pub fn add(pool: &DbPool, name: &str, kind: MachineType, target_oee: f64) -> AppResult<Machine> {
        if name.trim().is_empty() {
            return Err(AppError::Other("machine name must not be empty".into()));
        }
        let mut machine = Machine::new(name, kind, validate_oee(target_oee)?);

        if find_machine(&pool.conn, kind, &machine.name)?.is_some() {
            return Err(AppError::DuplicateMachine(format!("{} {}", kind, machine.name)));
        }

        machine.id = insert_machine(&pool.conn, &machine)?;

        ttlog_quiet(
            &pool.conn,
            LogOp::Add,
            &format!("machine {}", machine.id),
            &format!("{} {} (OEE {:.1}%)", machine.kind, machine.name, machine.target_oee),
        );
        success(format!(
            "Machine #{} added: {} {}",
            machine.id, machine.kind, machine.name
        ));
        Ok(machine)
    }

    pub fn edit(
        pool: &DbPool,
        id: i64,
        name: Option<&str>,
        kind: Option<MachineType>,
        target_oee: Option<f64>,
    ) -> AppResult<Machine> {
        let mut machine = load_machine(&pool.conn, id)?.ok_or(AppError::MachineNotFound(id))?;

        if let Some(n) = name {
            machine.name = n.trim().to_string();
        }
        if let Some(k) = kind {
            machine.kind = k;
        }
        if let Some(oee) = target_oee {
            machine.target_oee = validate_oee(oee)?;
        }

        if let Some(other) = find_machine(&pool.conn, machine.kind, &machine.name)?
            && other.id != machine.id
        {
            return Err(AppError::DuplicateMachine(format!(
                "{} {}",
                machine.kind, machine.name
            )));
        }

        update_machine(&pool.conn, &machine)?;
        ttlog_quiet(
            &pool.conn,
            LogOp::Edit,
            &format!("machine {}", id),
            &format!("{} {} (OEE {:.1}%)", machine.kind, machine.name, machine.target_oee),
        );
        success(format!("Machine #{} updated", id));
        Ok(machine)
    }

    pub fn list(pool: &DbPool) -> AppResult<Vec<Machine>> {
        load_machines(&pool.conn)
    }

    pub fn delete(pool: &DbPool, id: i64) -> AppResult<()> {
        if delete_machine(&pool.conn, id)? == 0 {
            return Err(AppError::MachineNotFound(id));
        }
        ttlog_quiet(&pool.conn, LogOp::Del, &format!("machine {}", id), "Machine deleted");
        success(format!("Machine #{} deleted", id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;
    use rusqlite::Connection;

    fn pool() -> DbPool {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        DbPool { conn }
    }

    #[test]
    fn oee_must_be_a_percentage() {
        assert!(validate_oee(85.0).is_ok());
        assert!(validate_oee(-1.0).is_err());
        assert!(validate_oee(120.0).is_err());
        assert!(validate_oee(f64::NAN).is_err());
    }

    #[test]
    fn duplicate_names_are_rejected_per_type() {
        let pool = pool();
        MachineLogic::add(&pool, "Lathe-1", MachineType::Cnc, 85.0).unwrap();
        assert!(matches!(
            MachineLogic::add(&pool, "lathe-1", MachineType::Cnc, 70.0),
            Err(AppError::DuplicateMachine(_))
        ));
        assert!(MachineLogic::add(&pool, "lathe-1", MachineType::Vmc, 70.0).is_ok());
    }

    #[test]
    fn edit_rejects_renaming_onto_another_machine() {
        let pool = pool();
        MachineLogic::add(&pool, "A", MachineType::Cnc, 80.0).unwrap();
        let b = MachineLogic::add(&pool, "B", MachineType::Cnc, 80.0).unwrap();
        assert!(MachineLogic::edit(&pool, b.id, Some("a"), None, None).is_err());

        let renamed = MachineLogic::edit(&pool, b.id, Some("C"), None, Some(90.0)).unwrap();
        assert_eq!(renamed.name, "C");
        assert_eq!(renamed.target_oee, 90.0);
    }

    #[test]
    fn deleting_an_unknown_machine_fails() {
        let pool = pool();
        assert!(matches!(
            MachineLogic::delete(&pool, 42),
            Err(AppError::MachineNotFound(42))
        ));
    }
}
