use super::machine_type::MachineType;
use crate::utils::time::round_hours;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Per-piece operation times in minutes; `setup` is minutes per job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationTimes {
    #[serde(default)]
    pub cnc: f64,
    #[serde(default)]
    pub vmc: f64,
    #[serde(default)]
    pub load_unload: f64,
    #[serde(default)]
    pub conv: f64,
    #[serde(default)]
    pub deburr: f64,
    #[serde(default)]
    pub sandblast: f64,
    #[serde(default)]
    pub setup: f64,
}

impl OperationTimes {
    /// Every operation for every piece, plus setup.
    pub fn whole_part_minutes(&self, qty: f64) -> f64 {
        let per_piece =
            self.cnc + self.vmc + self.conv + self.deburr + self.sandblast + self.load_unload;
        per_piece * qty + self.setup
    }

    /// The primary machining operation of `kind` plus load/unload per piece, plus setup.
    pub fn machine_only_minutes(&self, kind: MachineType, qty: f64) -> f64 {
        let primary = match kind {
            MachineType::Cnc => self.cnc,
            MachineType::Vmc => self.vmc,
        };
        (primary + self.load_unload) * qty + self.setup
    }
}

/// Minutes → hours, two decimals, never negative.
pub fn minutes_to_hours(mins: f64) -> f64 {
    round_hours((mins / 60.0).max(0.0))
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionPlan {
    pub id: i64,
    pub job_card_no: String,
    pub part_no: String,
    pub part_name: String,
    pub machine_type: MachineType,
    pub machine_no: String,
    pub plan_qty: f64,
    pub setup_no: String,
    pub operations: OperationTimes,
    pub start: NaiveDateTime,
    pub total_hours: f64,
    pub machine_only_hours: f64,
    pub target_whole_part: Option<NaiveDateTime>,
    pub target_machine_only: Option<NaiveDateTime>,
    pub working_days: i64,
    pub created_at: String,
}

impl ProductionPlan {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        job_card_no: &str,
        part_no: &str,
        part_name: &str,
        machine_type: MachineType,
        machine_no: &str,
        plan_qty: f64,
        setup_no: &str,
        operations: OperationTimes,
        start: NaiveDateTime,
    ) -> Self {
        let mut plan = Self {
            id: 0,
            job_card_no: job_card_no.trim().to_string(),
            part_no: part_no.trim().to_string(),
            part_name: part_name.trim().to_string(),
            machine_type,
            machine_no: machine_no.trim().to_string(),
            plan_qty,
            setup_no: setup_no.trim().to_string(),
            operations,
            start,
            total_hours: 0.0,
            machine_only_hours: 0.0,
            target_whole_part: None,
            target_machine_only: None,
            working_days: 0,
            created_at: Local::now().to_rfc3339(),
        };
        plan.recompute_hours();
        plan
    }

    /// Refresh `total_hours` and `machine_only_hours` from quantity and operation times.
    pub fn recompute_hours(&mut self) {
        self.total_hours = minutes_to_hours(self.operations.whole_part_minutes(self.plan_qty));
        self.machine_only_hours = minutes_to_hours(
            self.operations
                .machine_only_minutes(self.machine_type, self.plan_qty),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::time::parse_datetime;

    fn ops() -> OperationTimes {
        OperationTimes {
            cnc: 2.5,
            vmc: 1.0,
            load_unload: 0.5,
            conv: 0.25,
            deburr: 0.5,
            sandblast: 0.25,
            setup: 45.0,
        }
    }

    #[test]
    fn whole_part_includes_every_operation_and_setup() {
        // (2.5 + 1 + 0.25 + 0.5 + 0.25 + 0.5) * 100 + 45 = 545
        assert_eq!(ops().whole_part_minutes(100.0), 545.0);
    }

    #[test]
    fn machine_only_uses_the_primary_operation_of_the_type() {
        assert_eq!(ops().machine_only_minutes(MachineType::Cnc, 100.0), 345.0);
        assert_eq!(ops().machine_only_minutes(MachineType::Vmc, 100.0), 195.0);
    }

    #[test]
    fn plan_hours_are_rounded() {
        let plan = ProductionPlan::new(
            "JC-1",
            "P-1",
            "Flange",
            MachineType::Cnc,
            "CNC-01",
            100.0,
            "S1",
            ops(),
            parse_datetime("2025-06-02T08:00").unwrap(),
        );
        assert_eq!(plan.total_hours, 9.08);
        assert_eq!(plan.machine_only_hours, 5.75);
        assert!(plan.total_hours >= plan.machine_only_hours);
    }
}
