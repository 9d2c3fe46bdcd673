//! duckpad - A lightweight DuckDB SQL script runner.

mod cli;
mod config;
mod error;
mod logging;
mod output;
mod query;
mod results;
mod script;
mod session;

use cli::Cli;
use config::Config;
use error::{DuckpadError, Result};
use query::QueryExecutor;
use session::Session;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    match cli.log_file.clone() {
        Some(path) => logging::init_file_logging(Some(path)),
        None => logging::init_stderr_logging(),
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_overrides();

    let format = cli.parse_output_format().map_err(DuckpadError::config)?;
    let engine = cli
        .engine
        .clone()
        .unwrap_or_else(|| config.engine.binary.clone());
    let target = cli.db_target(config.defaults.database.as_deref());
    let script = cli.script_text()?;

    info!("Running against {} with engine '{}'", target, engine);

    let session = Session::with_executor(target, QueryExecutor::with_engine_path(engine));
    let outcomes = session.run_script(&script).await;

    let mut failures = 0usize;
    for outcome in &outcomes {
        println!("{}", output::render_outcome(outcome, format));
        if outcome.is_failure() {
            failures += 1;
        }
    }
    session.dispose();

    if failures > 0 {
        return Err(DuckpadError::execution(format!(
            "{failures} of {} statements failed",
            outcomes.len()
        )));
    }

    Ok(())
}
