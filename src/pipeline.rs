use std::fmt;

use crate::config::Config;
use crate::error::Result;
use crate::file_load::{read_table, Dataset};
use crate::pg_load::{bulk_load, ConnectionDescriptor, Engine, LoadReport};

/// Steps of a run. Control only moves forward; any step may end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    ConfigResolved,
    DataRead,
    Connected,
    Loaded,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Start => "START",
            Stage::ConfigResolved => "CONFIG_RESOLVED",
            Stage::DataRead => "DATA_READ",
            Stage::Connected => "CONNECTED",
            Stage::Loaded => "LOADED",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    log::debug!("{} -> {}", stage, next);
    *stage = next;
}

/// Read the input file and replace the PostgreSQL table described by `config`.
pub fn run(config: &Config) -> Result<LoadReport> {
    run_with_engine(config, |dataset| {
        let descriptor = ConnectionDescriptor::from_config(config);
        Engine::connect(&descriptor, dataset)
    })
}

/// Same as [`run`], with the destination supplied by `connect`.
/// `connect` is only called once the input file has been read, and receives the
/// dataset whose database the engine must share.
pub fn run_with_engine<F>(config: &Config, connect: F) -> Result<LoadReport>
where
    F: FnOnce(&Dataset) -> Result<Engine>,
{
    let mut stage = Stage::ConfigResolved;
    log::debug!("{} -> {}", Stage::Start, stage);

    let result = drive(config, connect, &mut stage);
    if result.is_err() {
        advance(&mut stage, Stage::Failed);
    }
    result
}

fn drive<F>(config: &Config, connect: F, stage: &mut Stage) -> Result<LoadReport>
where
    F: FnOnce(&Dataset) -> Result<Engine>,
{
    let dataset = read_table(&config.input_file)?;
    advance(stage, Stage::DataRead);

    let report = {
        let engine = connect(&dataset)?;
        log::info!("Database engine created successfully.");
        advance(stage, Stage::Connected);

        bulk_load(&engine, config, &dataset)?
        // engine dropped here, releasing the connection
    };
    advance(stage, Stage::Loaded);

    advance(stage, Stage::Done);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    #[test]
    fn stage_names() {
        assert_eq!(Stage::ConfigResolved.to_string(), "CONFIG_RESOLVED");
        assert_eq!(Stage::Failed.to_string(), "FAILED");
    }

    #[test]
    fn missing_input_never_connects() {
        let config = Config::resolve(|key| match key {
            "DB_USER" | "DB_PASSWORD" | "DB_NAME" => Some("x".to_string()),
            _ => None,
        })
        .unwrap()
        .with_input_file("/no/such/dir/extract.csv");

        let err = run_with_engine(&config, |_| panic!("connect must not be called")).unwrap_err();
        assert!(matches!(err, LoadError::InputNotFound { .. }));
    }
}
