//! Domain records: calendar days, machines, production plans and logged jobs.

pub mod calendar_day;
pub mod job;
pub mod machine;
pub mod machine_type;
pub mod plan;
