pub mod calendar;
pub mod config;
pub mod job;
pub mod log;
pub mod machine;
pub mod plan;
pub mod scheduler;
