use std::process;

use duckdb_pg_loader::config::optional_env_file;
use duckdb_pg_loader::{run, Config, LoadError};

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

fn main() {
    init_logging();

    // A missing .env is fine, an unreadable or malformed one is not
    if let Err(e) = optional_env_file(dotenvy::dotenv()) {
        log::error!("{}", e);
        process::exit(e.exit_code());
    }

    let config = Config::from_env().unwrap_or_else(|e| {
        log::error!("{}", e);
        if let LoadError::MissingConfig(_) = e {
            log::error!("Set them locally (or use a .env file in development). Exiting.");
        }
        process::exit(e.exit_code());
    });

    match run(&config) {
        Ok(report) => log::info!("{}", report),
        Err(e) => {
            log::error!("{}", e);
            process::exit(e.exit_code());
        }
    }
}
