use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::{LoadError, Result};
use crate::file_load::Dataset;
use crate::pg_load::bulk_loader::{write_batches, LoadReport};
use crate::pg_load::engine::Engine;
use crate::pg_load::load_strategy::LoadStrategy;

/// Drop the destination, recreate it, then insert batches straight into it.
/// A failure partway leaves whatever batches already committed.
pub struct ReplaceStrategy {
    batch_size: NonZeroUsize,
}

impl ReplaceStrategy {
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self { batch_size }
    }
}

impl LoadStrategy for ReplaceStrategy {
    fn load(&self, engine: &Engine, table_name: &str, dataset: &Dataset) -> Result<LoadReport> {
        engine.drop_table(table_name).map_err(LoadError::Load)?;
        engine
            .create_table(table_name, dataset.schema())
            .map_err(LoadError::Load)?;

        let batches = write_batches(engine, table_name, dataset, self.batch_size)?;

        log::debug!(
            "Table {} recreated and {} rows inserted",
            engine.qualified_table(table_name),
            dataset.row_count()
        );
        Ok(LoadReport {
            rows: dataset.row_count(),
            batches,
            elapsed: Duration::ZERO,
        })
    }
}
