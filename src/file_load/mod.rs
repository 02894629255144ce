pub mod dataset;
pub mod table_reader;

use std::fmt;
use std::path::Path;

pub use dataset::{Column, ColumnType, Dataset, Row, Schema};
pub use table_reader::read_table;

// Enum that represents the supported input formats
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    Csv,
    Parquet,
}

impl FileType {
    // Pick the decoder from the file suffix, anything that isn't parquet is treated as delimited text
    pub fn from_path(file_path: &str) -> FileType {
        let is_parquet = Path::new(file_path)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        if is_parquet {
            FileType::Parquet
        } else {
            FileType::Csv
        }
    }

    // DuckDB table function used to decode this format
    pub(crate) fn reader_function(&self) -> &'static str {
        match self {
            FileType::Csv => "read_csv",
            FileType::Parquet => "read_parquet",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Csv => write!(f, "CSV"),
            FileType::Parquet => write!(f, "Parquet"),
        }
    }
}
