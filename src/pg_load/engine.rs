use std::ops::Range;
use std::path::Path;

use duckdb::Connection;

use crate::error::{LoadError, Result};
use crate::file_load::dataset::{quote_identifier, quote_literal, Dataset, Schema};
use crate::pg_load::descriptor::ConnectionDescriptor;

// Catalog alias the destination database is attached under
pub const TARGET_CATALOG: &str = "pg_target";

/// Owns a DuckDB connection to the dataset's in-memory database, with the
/// destination database attached next to it. Rows are copied catalog to catalog,
/// so no value is converted on the Rust side.
/// Dropping the engine detaches the destination and closes the remote session.
pub struct Engine {
    conn: Connection,
    catalog: String,
}

impl Engine {
    /// Attach a PostgreSQL database through the DuckDB postgres extension.
    pub fn connect(descriptor: &ConnectionDescriptor, dataset: &Dataset) -> Result<Self> {
        log::debug!("Attaching {:?}", descriptor);
        let conn = Self::open_with_postgres(dataset).map_err(LoadError::Engine)?;

        conn.execute_batch(&format!(
            "ATTACH {} AS {} (TYPE POSTGRES);",
            quote_literal(&descriptor.to_string()),
            TARGET_CATALOG
        ))
        .map_err(LoadError::Engine)?;

        Ok(Self {
            conn,
            catalog: TARGET_CATALOG.to_string(),
        })
    }

    // Install and load the postgres extension before attaching
    fn open_with_postgres(dataset: &Dataset) -> duckdb::Result<Connection> {
        let conn = dataset.connection().try_clone()?;
        conn.execute_batch("INSTALL postgres; LOAD postgres;")?;
        Ok(conn)
    }

    /// Attach a local DuckDB database file as the destination, used for dry runs.
    pub fn attach_duckdb_file(path: &Path, dataset: &Dataset) -> Result<Self> {
        let conn = dataset.connection().try_clone().map_err(LoadError::Engine)?;
        conn.execute_batch(&format!(
            "ATTACH {} AS {};",
            quote_literal(&path.to_string_lossy()),
            TARGET_CATALOG
        ))
        .map_err(LoadError::Engine)?;

        Ok(Self {
            conn,
            catalog: TARGET_CATALOG.to_string(),
        })
    }

    // Get the catalog qualified table
    pub fn qualified_table(&self, table_name: &str) -> String {
        format!("{}.{}", quote_identifier(&self.catalog), quote_identifier(table_name))
    }

    // Drop the existing table, schema and data
    pub fn drop_table(&self, table_name: &str) -> duckdb::Result<()> {
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {};",
            self.qualified_table(table_name)
        ))
    }

    // Create an empty table in the destination from the dataset schema
    pub fn create_table(&self, table_name: &str, schema: &Schema) -> duckdb::Result<()> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE {} ({});",
            self.qualified_table(table_name),
            schema.column_definitions()
        ))
    }

    /// Replace `table_name` with `staging_name` inside one transaction.
    pub fn swap_table(&self, staging_name: &str, table_name: &str) -> duckdb::Result<()> {
        let swap = format!(
            "BEGIN TRANSACTION;
            DROP TABLE IF EXISTS {};
            ALTER TABLE {} RENAME TO {};
            COMMIT;",
            self.qualified_table(table_name),
            self.qualified_table(staging_name),
            quote_identifier(table_name)
        );

        if let Err(e) = self.conn.execute_batch(&swap) {
            if let Err(rollback) = self.conn.execute_batch("ROLLBACK;") {
                log::debug!("Rollback after failed swap also failed: {}", rollback);
            }
            return Err(e);
        }
        Ok(())
    }

    pub fn row_count(&self, table_name: &str) -> duckdb::Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT count(*) FROM {};", self.qualified_table(table_name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Copy the dataset rows with rowid in `rows` into the destination table.
    pub(crate) fn insert_batch(
        &self,
        table_name: &str,
        dataset: &Dataset,
        rows: Range<usize>,
    ) -> duckdb::Result<()> {
        self.conn.execute_batch(&format!(
            "INSERT INTO {} SELECT * FROM {} WHERE rowid >= {} AND rowid < {} ORDER BY rowid;",
            self.qualified_table(table_name),
            dataset.source_table(),
            rows.start,
            rows.end
        ))
    }
}

// Attachments belong to the database, not the connection, so detach explicitly
impl Drop for Engine {
    fn drop(&mut self) {
        let detach = format!("DETACH {};", quote_identifier(&self.catalog));
        if let Err(e) = self.conn.execute_batch(&detach) {
            log::debug!("Detaching {} failed: {}", self.catalog, e);
        }
    }
}
