//! Bulk-load a CSV or Parquet extract into a PostgreSQL table.
//!
//! The destination table is dropped and recreated from the file's inferred schema on
//! every run, then filled in fixed-size batches.

pub mod config;
pub mod error;
pub mod file_load;
pub mod pg_load;
pub mod pipeline;

pub use config::{Config, LoadMode};
pub use error::LoadError;
pub use pipeline::{run, run_with_engine, Stage};
