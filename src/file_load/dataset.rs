use std::fmt;
use std::ops::Range;

use duckdb::types::Value;
use duckdb::Connection;

/// Logical column types inferred by the decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal { precision: u8, scale: u8 },
    Varchar,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Blob,
    /// Any other DuckDB type, kept verbatim.
    Other(String),
}

impl ColumnType {
    /// Parse a DuckDB type name as reported by `information_schema.columns`.
    pub fn from_duckdb(type_name: &str) -> ColumnType {
        let normalized = type_name.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "BOOLEAN" | "BOOL" => ColumnType::Boolean,
            "TINYINT" => ColumnType::TinyInt,
            "SMALLINT" => ColumnType::SmallInt,
            "INTEGER" | "INT" => ColumnType::Integer,
            "BIGINT" => ColumnType::BigInt,
            "FLOAT" | "REAL" => ColumnType::Float,
            "DOUBLE" => ColumnType::Double,
            "VARCHAR" | "TEXT" => ColumnType::Varchar,
            "DATE" => ColumnType::Date,
            "TIME" => ColumnType::Time,
            "TIMESTAMP" => ColumnType::Timestamp,
            "TIMESTAMP WITH TIME ZONE" | "TIMESTAMPTZ" => ColumnType::TimestampTz,
            "BLOB" => ColumnType::Blob,
            other => Self::parse_decimal(other)
                .unwrap_or_else(|| ColumnType::Other(type_name.trim().to_string())),
        }
    }

    // DECIMAL(p,s)
    fn parse_decimal(type_name: &str) -> Option<ColumnType> {
        let args = type_name.strip_prefix("DECIMAL(")?.strip_suffix(')')?;
        let (precision, scale) = args.split_once(',')?;
        Some(ColumnType::Decimal {
            precision: precision.trim().parse().ok()?,
            scale: scale.trim().parse().ok()?,
        })
    }

    /// DDL spelling used when the destination table is created.
    pub fn sql_type(&self) -> String {
        match self {
            ColumnType::Boolean => "BOOLEAN".into(),
            ColumnType::TinyInt => "TINYINT".into(),
            ColumnType::SmallInt => "SMALLINT".into(),
            ColumnType::Integer => "INTEGER".into(),
            ColumnType::BigInt => "BIGINT".into(),
            ColumnType::Float => "FLOAT".into(),
            ColumnType::Double => "DOUBLE".into(),
            ColumnType::Decimal { precision, scale } => format!("DECIMAL({},{})", precision, scale),
            ColumnType::Varchar => "VARCHAR".into(),
            ColumnType::Date => "DATE".into(),
            ColumnType::Time => "TIME".into(),
            ColumnType::Timestamp => "TIMESTAMP".into(),
            ColumnType::TimestampTz => "TIMESTAMP WITH TIME ZONE".into(),
            ColumnType::Blob => "BLOB".into(),
            ColumnType::Other(name) => name.clone(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_type())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

/// Ordered column list shared by the reader and the loader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// `"name" TYPE, ...` for a CREATE TABLE statement.
    pub fn column_definitions(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} {}", quote_identifier(&c.name), c.column_type.sql_type()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{}: {}", c.name, c.column_type))
            .collect();
        write!(f, "[{}]", fields.join(", "))
    }
}

pub type Row = Vec<Value>;

/// Table in the reader's in-memory database that holds the decoded rows.
pub const SOURCE_TABLE: &str = "__load_source";

/// Rows read from the input file, in file order, over a fixed schema.
///
/// The rows stay in a DuckDB table owned by the dataset's in-memory database, so
/// every DuckDB type (lists and structs included) reaches the destination unchanged.
/// Rowids run `0..row_count` in file order.
pub struct Dataset {
    schema: Schema,
    row_count: usize,
    conn: Connection,
}

impl Dataset {
    pub(crate) fn new(schema: Schema, row_count: usize, conn: Connection) -> Self {
        Self {
            schema,
            row_count,
            conn,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    // Connection to the database holding the rows
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Fully qualified name of the row table, valid on any connection to this database.
    pub fn source_table(&self) -> String {
        format!(
            "{}.{}.{}",
            quote_identifier("memory"),
            quote_identifier("main"),
            quote_identifier(SOURCE_TABLE)
        )
    }

    /// Rowid ranges of at most `batch_size` rows covering the whole dataset.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Range<usize>> {
        let size = batch_size.max(1);
        let total = self.row_count;
        (0..total)
            .step_by(size)
            .map(move |start| start..(start + size).min(total))
    }

    /// Materialise the rows in `range` as values.
    pub fn fetch_rows(&self, range: Range<usize>) -> duckdb::Result<Vec<Row>> {
        let width = self.schema.len();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM {} WHERE rowid >= ? AND rowid < ? ORDER BY rowid;",
            self.source_table()
        ))?;
        let mut rows = stmt.query([range.start as i64, range.end as i64])?;
        let mut data = Vec::new();

        while let Some(row) = rows.next()? {
            let values = (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<duckdb::Result<Row>>()?;
            data.push(values);
        }
        Ok(data)
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("schema", &self.schema)
            .field("row_count", &self.row_count)
            .finish()
    }
}

/// Double-quote an SQL identifier, doubling any embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Single-quote an SQL string literal, doubling any embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
