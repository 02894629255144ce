use thiserror::Error;

/// Every way a load run can fail. Each variant is fatal at the point it is raised.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("The file '{path}' was not found. Please ensure that the ETL step has generated it.")]
    InputNotFound { path: String },

    #[error("Error reading file '{path}': {source}")]
    InputRead {
        path: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("Error creating database engine: {0}")]
    Engine(#[source] duckdb::Error),

    #[error("An error occurred during the data loading: {0}")]
    Load(#[source] duckdb::Error),
}

impl LoadError {
    /// Process exit status for this class of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::MissingConfig(_) | LoadError::InvalidConfig(_) => 2,
            LoadError::InputNotFound { .. } | LoadError::InputRead { .. } => 3,
            LoadError::Engine(_) => 4,
            LoadError::Load(_) => 5,
        }
    }
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;
