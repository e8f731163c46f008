use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::LogLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    match cmd {
        Commands::Log { print: true } => LogLogic::print_log(&DbPool::open(&cfg.database)?),
        Commands::Log { print: false } => {
            info("Nothing to do: use `rjobplan log --print` to show the audit trail.");
            Ok(())
        }
        _ => Ok(()),
    }
}
