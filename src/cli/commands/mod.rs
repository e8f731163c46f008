pub mod calendar;
pub mod config;
pub mod db;
pub mod day;
pub mod init;
pub mod job;
pub mod log;
pub mod machine;
pub mod plan;
pub mod project;
