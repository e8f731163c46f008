use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineType {
    Cnc, // CNC turning
    Vmc, // vertical machining centre
}

impl MachineType {
    pub fn code(&self) -> &'static str {
        match self {
            MachineType::Cnc => "CNC",
            MachineType::Vmc => "VMC",
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        self.code()
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CNC" => Some(MachineType::Cnc),
            "VMC" => Some(MachineType::Vmc),
            _ => None,
        }
    }

    /// Helper: convert input code from CLI (lowercase or uppercase)
    pub fn from_code(code: &str) -> Option<Self> {
        MachineType::from_db_str(&code.trim().to_uppercase())
    }
}

impl std::fmt::Display for MachineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
