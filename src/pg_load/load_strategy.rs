use crate::error::Result;
use crate::file_load::Dataset;
use crate::pg_load::bulk_loader::LoadReport;
use crate::pg_load::engine::Engine;

/// Strategy trait for replacing the destination table with a dataset.
/// Both strategies drop the previous table and recreate it from the dataset schema,
/// they differ in what an observer can see while the load is running.
pub trait LoadStrategy {
    fn load(&self, engine: &Engine, table_name: &str, dataset: &Dataset) -> Result<LoadReport>;
}
