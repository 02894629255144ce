use std::fmt;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use crate::config::{Config, LoadMode};
use crate::error::{LoadError, Result};
use crate::file_load::Dataset;
use crate::pg_load::engine::Engine;
use crate::pg_load::load_strategy::LoadStrategy;
use crate::pg_load::replace_strategy::ReplaceStrategy;
use crate::pg_load::staged_strategy::StagedReplaceStrategy;

/// Outcome of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub rows: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully loaded {} rows into PostgreSQL in {:.2} seconds.",
            self.rows,
            self.elapsed.as_secs_f64()
        )
    }
}

pub fn strategy_for(mode: LoadMode, batch_size: NonZeroUsize) -> Box<dyn LoadStrategy> {
    match mode {
        LoadMode::Replace => Box::new(ReplaceStrategy::new(batch_size)),
        LoadMode::Staged => Box::new(StagedReplaceStrategy::new(batch_size)),
    }
}

/// Replace the configured table with `dataset` and time the whole operation.
pub fn bulk_load(engine: &Engine, config: &Config, dataset: &Dataset) -> Result<LoadReport> {
    log::info!("Loading data into table '{}'...", config.table_name);
    let start = Instant::now();

    let strategy = strategy_for(config.load_mode, config.batch_size);
    let report = strategy.load(engine, &config.table_name, dataset)?;

    Ok(LoadReport {
        elapsed: start.elapsed(),
        ..report
    })
}

/// Write every row of `dataset` into `table_name`, `batch_size` rows at a time.
/// The table must already exist with the dataset's schema. Returns the batch count.
pub(crate) fn write_batches(
    engine: &Engine,
    table_name: &str,
    dataset: &Dataset,
    batch_size: NonZeroUsize,
) -> Result<usize> {
    let mut batches = 0;
    let mut written = 0;
    for rows in dataset.batches(batch_size.get()) {
        written += rows.len();
        engine
            .insert_batch(table_name, dataset, rows)
            .map_err(LoadError::Load)?;
        batches += 1;
        log::debug!(
            "Batch {} committed ({}/{} rows)",
            batches,
            written,
            dataset.row_count()
        );
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_formats_rows_and_seconds() {
        let report = LoadReport {
            rows: 1234,
            batches: 1,
            elapsed: Duration::from_millis(2500),
        };
        assert_eq!(
            report.to_string(),
            "Successfully loaded 1234 rows into PostgreSQL in 2.50 seconds."
        );
    }
}
