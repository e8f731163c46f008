use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::{LogOp, ttlog_quiet};
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped in test mode)
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.clone(), cli.test)?;
    let db_path = db_path.to_string_lossy().to_string();

    println!("⚙️  Initializing rJobPlan…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", db_path);

    let pool = DbPool::new(&db_path)?;
    let applied = run_pending_migrations(&pool.conn)?;

    println!(
        "✅ Database initialized at {} ({} migration(s) applied)",
        db_path, applied
    );

    ttlog_quiet(
        &pool.conn,
        LogOp::Init,
        "Database initialized",
        &format!("Database initialized at {}", db_path),
    );

    println!("🎉 rJobPlan initialization completed!");
    Ok(())
}
