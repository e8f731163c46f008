//! rJobPlan main entrypoint.

use rjobplan::run;
use rjobplan::ui::messages::error;
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr; RJOBPLAN_LOG=debug shows projection details.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RJOBPLAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    println!();
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
