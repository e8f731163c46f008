use clap::{Parser, Subcommand};

/// Command-line interface definition for rJobPlan
/// Production planning CLI: working calendar, machines and target dates on SQLite
#[derive(Parser)]
#[command(
    name = "rjobplan",
    version = env!("CARGO_PKG_VERSION"),
    about = "A production planning CLI: working calendar, machines and job target dates using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their default values")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Create or update one calendar day
    Day {
        /// Date of the day (YYYY-MM-DD)
        date: String,

        #[arg(long = "shift-start", help = "Shift start (HH:MM)")]
        shift_start: Option<String>,

        #[arg(long = "shift-end", help = "Shift end (HH:MM); at or before the start means overnight")]
        shift_end: Option<String>,

        #[arg(long = "off", help = "Mark the day as non-working (clears the shift)")]
        off: bool,

        #[arg(
            long = "break",
            value_name = "NAME=HH:MM-HH:MM",
            help = "Set or add a regular break (repeatable)"
        )]
        breaks: Vec<String>,

        #[arg(
            long = "disable-break",
            value_name = "NAME",
            help = "Disable a regular break (repeatable)"
        )]
        disable_breaks: Vec<String>,

        #[arg(
            long = "special",
            value_name = "DESC=HH:MM-HH:MM",
            conflicts_with = "no_special",
            help = "Set the special break of the day"
        )]
        special: Option<String>,

        #[arg(long = "no-special", help = "Remove the special break")]
        no_special: bool,

        #[arg(long = "sunday-work", conflicts_with = "no_sunday_work", help = "Work on this Sunday")]
        sunday_work: bool,

        #[arg(long = "no-sunday-work", help = "Clear the Sunday work override")]
        no_sunday_work: bool,

        #[arg(long = "reset", help = "Start from the default day before applying changes")]
        reset: bool,

        #[arg(long = "delete", help = "Delete the calendar entry for this date")]
        delete: bool,
    },

    /// List calendar days as the scheduler sees them
    Calendar {
        #[arg(long, short, help = "Filter by year/month/day or a custom range (A:B)")]
        period: Option<String>,
    },

    /// Manage machines
    Machine {
        #[command(subcommand)]
        action: MachineAction,
    },

    /// Manage production plans (jobs)
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },

    /// Log daily production per job: header, entries, losses
    Job {
        #[command(subcommand)]
        action: JobAction,
    },

    /// Project a completion date for a number of working hours
    Project {
        #[arg(long = "start", help = "Start moment (YYYY-MM-DDTHH:MM)")]
        start: String,

        #[arg(long = "hours", help = "Required working hours", allow_negative_numbers = true)]
        hours: f64,
    },
}

#[derive(Subcommand)]
pub enum MachineAction {
    /// Register a machine
    Add {
        #[arg(long)]
        name: String,

        #[arg(long = "type", help = "Machine type: CNC or VMC")]
        kind: String,

        #[arg(long = "target-oee", help = "Target OEE in percent")]
        target_oee: f64,
    },

    /// Change a machine
    Edit {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "type", help = "Machine type: CNC or VMC")]
        kind: Option<String>,

        #[arg(long = "target-oee", help = "Target OEE in percent")]
        target_oee: Option<f64>,
    },

    /// List machines
    List,

    /// Delete a machine by id
    Del { id: i64 },
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Record a production plan and project its target dates
    Add {
        #[arg(long = "job-card")]
        job_card: String,

        #[arg(long = "part-no")]
        part_no: String,

        #[arg(long = "part-name", default_value = "")]
        part_name: String,

        #[arg(long = "type", help = "Machine type: CNC or VMC")]
        kind: String,

        #[arg(long = "machine", default_value = "")]
        machine_no: String,

        #[arg(long = "qty", help = "Planned quantity")]
        qty: f64,

        #[arg(long = "setup-no", default_value = "")]
        setup_no: String,

        #[arg(long = "start", help = "Start moment (YYYY-MM-DDTHH:MM)")]
        start: String,

        #[arg(long, default_value_t = 0.0, help = "CNC minutes per piece")]
        cnc: f64,

        #[arg(long, default_value_t = 0.0, help = "VMC minutes per piece")]
        vmc: f64,

        #[arg(long = "load-unload", default_value_t = 0.0, help = "Load/unload minutes per piece")]
        load_unload: f64,

        #[arg(long, default_value_t = 0.0, help = "Conventional machining minutes per piece")]
        conv: f64,

        #[arg(long, default_value_t = 0.0, help = "Deburr minutes per piece")]
        deburr: f64,

        #[arg(long, default_value_t = 0.0, help = "Sandblast minutes per piece")]
        sandblast: f64,

        #[arg(long = "setup", default_value_t = 0.0, help = "Setup minutes per job")]
        setup: f64,
    },

    /// List production plans
    List,

    /// Delete a production plan by job card number
    Del { job_card: String },

    /// Re-project target dates against the current calendar
    Refresh {
        #[arg(required_unless_present = "all")]
        job_card: Option<String>,

        #[arg(long, help = "Refresh every plan")]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum JobAction {
    /// Record a job worked on a machine on one date
    Add {
        #[arg(long, help = "Production date (YYYY-MM-DD)")]
        date: String,

        #[arg(long = "job-no")]
        job_no: String,

        #[arg(long = "machine", help = "Machine number")]
        machine_no: String,

        #[arg(long = "job-card")]
        job_card: String,

        #[arg(long = "part-name")]
        part_name: String,

        #[arg(long = "part-no", default_value = "")]
        part_no: String,

        #[arg(long = "op-no", default_value = "")]
        op_no: String,

        #[arg(long, default_value = "")]
        setter: String,

        #[arg(long = "lot-qty", default_value_t = 0.0)]
        lot_qty: f64,

        #[arg(long = "target-prod", default_value_t = 0.0, help = "Target production quantity")]
        target_prod: f64,

        #[arg(long = "cycle-time", default_value_t = 0.0, help = "Cycle time in minutes")]
        cycle_time: f64,
    },

    /// Append a production entry to a job
    Entry {
        id: i64,

        #[arg(long = "opr-no", default_value = "")]
        opr_no: String,

        #[arg(long = "target-qty", default_value_t = 0.0)]
        target_qty: f64,

        #[arg(long = "actual-qty", default_value_t = 0.0)]
        actual_qty: f64,

        #[arg(long = "rejection-qty", default_value_t = 0.0)]
        rejection_qty: f64,

        #[arg(long = "cycle-time", default_value_t = 0.0, help = "Cycle time in minutes")]
        cycle_time: f64,

        #[arg(long = "duration-hrs", default_value_t = 0.0, help = "Actual run duration in hours")]
        duration_hrs: f64,

        #[arg(
            long = "loss",
            value_name = "KIND=HOURS",
            help = "Lost hours by reason, e.g. tool_change=0.5 (repeatable)"
        )]
        losses: Vec<String>,

        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// List jobs by production date
    List {
        #[arg(long, short, help = "Filter by year/month/day or a custom range (A:B)")]
        period: Option<String>,
    },

    /// Every job logged against a job card, newest first, with totals
    Report { job_card: String },

    /// Delete a job and its entries
    Del { id: i64 },
}
