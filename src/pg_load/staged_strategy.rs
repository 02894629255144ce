use std::num::NonZeroUsize;
use std::time::Duration;

use crate::error::{LoadError, Result};
use crate::file_load::Dataset;
use crate::pg_load::bulk_loader::{write_batches, LoadReport};
use crate::pg_load::engine::Engine;
use crate::pg_load::load_strategy::LoadStrategy;

const STAGING_SUFFIX: &str = "__staging";

/// Load into a staging table, then swap it in with one transaction.
/// The destination keeps its previous contents until the swap commits.
pub struct StagedReplaceStrategy {
    batch_size: NonZeroUsize,
}

impl StagedReplaceStrategy {
    pub fn new(batch_size: NonZeroUsize) -> Self {
        Self { batch_size }
    }

    pub fn staging_name(table_name: &str) -> String {
        format!("{}{}", table_name, STAGING_SUFFIX)
    }
}

impl LoadStrategy for StagedReplaceStrategy {
    fn load(&self, engine: &Engine, table_name: &str, dataset: &Dataset) -> Result<LoadReport> {
        let staging = Self::staging_name(table_name);

        // Leftovers from an earlier failed run
        engine.drop_table(&staging).map_err(LoadError::Load)?;
        engine
            .create_table(&staging, dataset.schema())
            .map_err(LoadError::Load)?;

        let batches = match write_batches(engine, &staging, dataset, self.batch_size) {
            Ok(batches) => batches,
            Err(e) => {
                if let Err(cleanup) = engine.drop_table(&staging) {
                    log::warn!("Could not drop staging table {}: {}", staging, cleanup);
                }
                return Err(e);
            }
        };

        engine
            .swap_table(&staging, table_name)
            .map_err(LoadError::Load)?;

        log::debug!(
            "Staging table {} swapped into {}",
            staging,
            engine.qualified_table(table_name)
        );
        Ok(LoadReport {
            rows: dataset.row_count(),
            batches,
            elapsed: Duration::ZERO,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_name_has_suffix() {
        assert_eq!(
            StagedReplaceStrategy::staging_name("price_paied"),
            "price_paied__staging"
        );
    }
}
