use super::machine_type::MachineType;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Machine {
    pub id: i64,            // ⇔ machines.id
    pub name: String,       // ⇔ machines.name (unique per kind, case-insensitive)
    pub kind: MachineType,  // ⇔ machines.type ('CNC' | 'VMC')
    pub target_oee: f64,    // ⇔ machines.target_oee (percent)
}

impl Machine {
    pub fn new(name: &str, kind: MachineType, target_oee: f64) -> Self {
        Self {
            id: 0,
            name: name.trim().to_string(),
            kind,
            target_oee,
        }
    }
}
