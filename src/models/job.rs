use crate::utils::time::round_hours;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reasons a machine was not producing during a logged run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossKind {
    Setting,
    ToolChange,
    InsertChange,
    DrillChange,
    TapChange,
    DimensionProblem,
    QcCheck,
    Operator,
    PowerCut,
    AirPressureLow,
    CycleTimeReduce,
    MachineHold,
    ProgramEdit,
    RawMaterialShortage,
    Rework,
    MachineAlarm,
    MachineMaintenance,
    MeetingTraining,
    ChipDisposal,
}

impl LossKind {
    pub const ALL: [LossKind; 19] = [
        LossKind::Setting,
        LossKind::ToolChange,
        LossKind::InsertChange,
        LossKind::DrillChange,
        LossKind::TapChange,
        LossKind::DimensionProblem,
        LossKind::QcCheck,
        LossKind::Operator,
        LossKind::PowerCut,
        LossKind::AirPressureLow,
        LossKind::CycleTimeReduce,
        LossKind::MachineHold,
        LossKind::ProgramEdit,
        LossKind::RawMaterialShortage,
        LossKind::Rework,
        LossKind::MachineAlarm,
        LossKind::MachineMaintenance,
        LossKind::MeetingTraining,
        LossKind::ChipDisposal,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LossKind::Setting => "setting",
            LossKind::ToolChange => "tool_change",
            LossKind::InsertChange => "insert_change",
            LossKind::DrillChange => "drill_change",
            LossKind::TapChange => "tap_change",
            LossKind::DimensionProblem => "dimension_problem",
            LossKind::QcCheck => "qc_check",
            LossKind::Operator => "operator",
            LossKind::PowerCut => "power_cut",
            LossKind::AirPressureLow => "air_pressure_low",
            LossKind::CycleTimeReduce => "cycle_time_reduce",
            LossKind::MachineHold => "machine_hold",
            LossKind::ProgramEdit => "program_edit",
            LossKind::RawMaterialShortage => "raw_material_shortage",
            LossKind::Rework => "rework",
            LossKind::MachineAlarm => "machine_alarm",
            LossKind::MachineMaintenance => "machine_maintenance",
            LossKind::MeetingTraining => "meeting_training",
            LossKind::ChipDisposal => "chip_disposal",
        }
    }

    /// CLI input: any case, `-` or `_` between words.
    pub fn from_code(code: &str) -> Option<Self> {
        let wanted = code.trim().to_lowercase().replace('-', "_");
        LossKind::ALL.into_iter().find(|k| k.code() == wanted)
    }
}

impl std::fmt::Display for LossKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One logged run of an operation within a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionEntry {
    pub opr_no: String,
    pub target_prod_qty: f64,
    pub actual_prod_qty: f64,
    pub rejection_qty: f64,
    pub cycle_time_min: f64,
    pub act_duration_hrs: f64,
    /// Hours lost, per reason.
    pub losses: BTreeMap<LossKind, f64>,
    pub remarks: String,
}

impl ProductionEntry {
    pub fn total_loss_hours(&self) -> f64 {
        round_hours(self.losses.values().sum())
    }
}

/// A job worked on a machine on one date, with its production entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: i64,                          // ⇔ jobs.id
    pub date: NaiveDate,                  // ⇔ jobs.date (YYYY-MM-DD)
    pub job_no: String,
    pub machine_no: String,
    pub job_card_no: String,              // not unique: one card spans several days
    pub part_name: String,
    pub part_no: String,
    pub op_no: String,
    pub setter: String,
    pub lot_qty: f64,
    pub target_prod: f64,
    pub cycle_time: f64,
    pub entries: Vec<ProductionEntry>,    // ⇔ jobs.production_entries (JSON)
    pub created_at: String,
}

impl JobRecord {
    pub fn new(
        date: NaiveDate,
        job_no: &str,
        machine_no: &str,
        job_card_no: &str,
        part_name: &str,
    ) -> Self {
        Self {
            id: 0,
            date,
            job_no: job_no.trim().to_string(),
            machine_no: machine_no.trim().to_string(),
            job_card_no: job_card_no.trim().to_string(),
            part_name: part_name.trim().to_string(),
            part_no: String::new(),
            op_no: String::new(),
            setter: String::new(),
            lot_qty: 0.0,
            target_prod: 0.0,
            cycle_time: 0.0,
            entries: Vec::new(),
            created_at: Local::now().to_rfc3339(),
        }
    }

    pub fn actual_qty(&self) -> f64 {
        self.entries.iter().map(|e| e.actual_prod_qty).sum()
    }

    pub fn rejection_qty(&self) -> f64 {
        self.entries.iter().map(|e| e.rejection_qty).sum()
    }

    pub fn loss_hours(&self) -> f64 {
        round_hours(self.entries.iter().map(ProductionEntry::total_loss_hours).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_codes_parse_loosely() {
        assert_eq!(LossKind::from_code("Tool-Change"), Some(LossKind::ToolChange));
        assert_eq!(LossKind::from_code(" power_cut "), Some(LossKind::PowerCut));
        assert_eq!(LossKind::from_code("coffee"), None);
        for kind in LossKind::ALL {
            assert_eq!(LossKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn entry_document_keeps_losses_by_code() {
        let mut entry = ProductionEntry {
            opr_no: "20".into(),
            actual_prod_qty: 90.0,
            ..ProductionEntry::default()
        };
        entry.losses.insert(LossKind::PowerCut, 0.5);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""power_cut":0.5"#));

        // older documents may lack fields
        let sparse: ProductionEntry = serde_json::from_str(r#"{"opr_no":"10"}"#).unwrap();
        assert_eq!(sparse.opr_no, "10");
        assert!(sparse.losses.is_empty());
    }

    #[test]
    fn job_totals_sum_every_entry() {
        let mut job = JobRecord::new(
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            "J1",
            "CNC-01",
            "JC-7",
            "Flange",
        );
        for (actual, rejected, loss) in [(90.0, 2.0, 0.25), (85.0, 1.0, 0.5)] {
            let mut e = ProductionEntry {
                actual_prod_qty: actual,
                rejection_qty: rejected,
                ..ProductionEntry::default()
            };
            e.losses.insert(LossKind::ToolChange, loss);
            e.losses.insert(LossKind::QcCheck, 0.1);
            job.entries.push(e);
        }

        assert_eq!(job.actual_qty(), 175.0);
        assert_eq!(job.rejection_qty(), 3.0);
        assert_eq!(job.loss_hours(), 0.95);
    }
}
