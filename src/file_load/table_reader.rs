use std::path::Path;

use duckdb::Connection;

use crate::error::{LoadError, Result};
use crate::file_load::dataset::{quote_literal, Column, ColumnType, Dataset, Schema, SOURCE_TABLE};
use crate::file_load::FileType;

/// Read the whole input file into memory.
///
/// The file is decoded by an in-memory DuckDB connection so CSV dialect sniffing and
/// type inference follow DuckDB's rules. Rows keep file order.
pub fn read_table(file_path: &str) -> Result<Dataset> {
    if !Path::new(file_path).exists() {
        return Err(LoadError::InputNotFound {
            path: file_path.to_string(),
        });
    }

    let file_type = FileType::from_path(file_path);
    log::info!("Reading clean data from '{}' as {}...", file_path, file_type);

    let reader = TableReader::open(file_path, file_type).map_err(|source| LoadError::InputRead {
        path: file_path.to_string(),
        source,
    })?;
    let dataset = reader.into_dataset().map_err(|source| LoadError::InputRead {
        path: file_path.to_string(),
        source,
    })?;

    log::debug!("The data schema is: {}", dataset.schema());
    log::info!(
        "Clean data loaded successfully ({} rows, {} columns).",
        dataset.row_count(),
        dataset.schema().len()
    );
    Ok(dataset)
}

// DuckDB expands `*`, `?` and `[...]` in reader paths, wrap each in a one-character class
fn escape_glob(file_path: &str) -> String {
    let mut escaped = String::with_capacity(file_path.len());
    for c in file_path.chars() {
        match c {
            '*' | '?' | '[' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

// Holds the DuckDB connection for the duration of the read
struct TableReader {
    conn: Connection,
}

impl TableReader {
    fn open(file_path: &str, file_type: FileType) -> duckdb::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let source = quote_literal(&escape_glob(file_path));
        let query = match file_type {
            FileType::Csv => format!(
                "CREATE TABLE {} AS SELECT * FROM {}({}, header = true);",
                SOURCE_TABLE,
                file_type.reader_function(),
                source
            ),
            FileType::Parquet => format!(
                "CREATE TABLE {} AS SELECT * FROM {}({});",
                SOURCE_TABLE,
                file_type.reader_function(),
                source
            ),
        };
        conn.execute_batch(&query)?;
        Ok(Self { conn })
    }

    // Column names and types in ordinal order
    fn schema(&self) -> duckdb::Result<Schema> {
        let query = "
        SELECT column_name, data_type
        FROM information_schema.columns
        WHERE table_name = ?
        ORDER BY ordinal_position";

        let mut stmt = self.conn.prepare(query)?;
        let mut rows = stmt.query([SOURCE_TABLE])?;
        let mut columns = Vec::new();

        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            let data_type: String = row.get(1)?;
            columns.push(Column {
                name,
                column_type: ColumnType::from_duckdb(&data_type),
            });
        }

        Ok(Schema { columns })
    }

    fn into_dataset(self) -> duckdb::Result<Dataset> {
        let schema = self.schema()?;
        let row_count: i64 = self.conn.query_row(
            &format!("SELECT count(*) FROM {};", SOURCE_TABLE),
            [],
            |row| row.get(0),
        )?;

        Ok(Dataset::new(schema, row_count as usize, self.conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckdb::types::Value;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_missing_file_is_not_found() {
        let err = read_table("/definitely/not/here/combined_ukhm_clean.csv").unwrap_err();
        assert!(matches!(err, LoadError::InputNotFound { .. }));
    }

    #[test]
    fn test_csv_schema_and_rows() {
        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp_file, "id,town,price").unwrap();
        writeln!(temp_file, "1,LONDON,250000.5").unwrap();
        writeln!(temp_file, "2,LEEDS,180000.25").unwrap();
        writeln!(temp_file, "3,YORK,99000.75").unwrap();

        let dataset = read_table(temp_file.path().to_str().unwrap()).unwrap();

        let names: Vec<&str> = dataset.schema().column_names().collect();
        assert_eq!(names, vec!["id", "town", "price"]);
        assert_eq!(dataset.schema().columns[1].column_type, ColumnType::Varchar);
        assert_eq!(dataset.row_count(), 3);
        let rows = dataset.fetch_rows(0..3).unwrap();
        assert_eq!(rows[0][1], Value::Text("LONDON".into()));
        assert_eq!(rows[2][1], Value::Text("YORK".into()));
    }

    #[test]
    fn test_header_only_csv_is_empty() {
        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp_file, "id,town").unwrap();

        let dataset = read_table(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(dataset.schema().len(), 2);
        assert_eq!(dataset.row_count(), 0);
    }

    #[test]
    fn test_corrupt_parquet_is_read_error() {
        let mut temp_file = NamedTempFile::with_suffix(".parquet").unwrap();
        temp_file.write_all(b"this is not parquet at all").unwrap();

        let err = read_table(temp_file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, LoadError::InputRead { .. }));
        assert!(err.to_string().starts_with("Error reading file"));
    }

    #[test]
    fn test_glob_characters_are_escaped() {
        assert_eq!(escape_glob("/data/extract.csv"), "/data/extract.csv");
        assert_eq!(escape_glob("a*b?c[1].csv"), "a[*]b[?]c[[]1].csv");
    }

    #[test]
    fn test_file_name_with_glob_characters_is_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("extract[2024]?*.csv");
        std::fs::write(&path, "id,town\n1,LONDON\n2,LEEDS\n").unwrap();
        // A sibling the unescaped pattern would also match
        std::fs::write(dir.path().join("extract2X.csv"), "other\nx\n").unwrap();

        let dataset = read_table(path.to_str().unwrap()).unwrap();
        let names: Vec<&str> = dataset.schema().column_names().collect();
        assert_eq!(names, vec!["id", "town"]);
        assert_eq!(dataset.row_count(), 2);
    }
}
