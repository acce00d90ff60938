use std::fmt::Display;

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Wrap the error as a configuration error with a message
    fn coda_config_err(self, msg: impl Display) -> std::result::Result<T, CodaError>;

    fn coda_network_err(self, msg: impl Display) -> std::result::Result<T, CodaError>;

    fn coda_parse_err(self, msg: impl Display) -> std::result::Result<T, CodaError>;

    fn coda_cache_err(self, msg: impl Display) -> std::result::Result<T, CodaError>;
}

impl<T, E: Display> ErrorContext<T> for std::result::Result<T, E> {
    fn coda_config_err(self, msg: impl Display) -> std::result::Result<T, CodaError> {
        self.map_err(|e| CodaError::Config(format!("{msg}: {e}")))
    }

    fn coda_network_err(self, msg: impl Display) -> std::result::Result<T, CodaError> {
        self.map_err(|e| CodaError::Network(format!("{msg}: {e}")))
    }

    fn coda_parse_err(self, msg: impl Display) -> std::result::Result<T, CodaError> {
        self.map_err(|e| CodaError::Parse(format!("{msg}: {e}")))
    }

    fn coda_cache_err(self, msg: impl Display) -> std::result::Result<T, CodaError> {
        self.map_err(|e| CodaError::Cache(format!("{msg}: {e}")))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Please set the CODA_TOKEN environment variable")]
    MissingToken,

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded for {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected API payload: {0}")]
    Payload(String),

    #[error("Pagination exceeded {limit} pages")]
    PaginationExceeded { limit: usize },

    #[error("Unknown field in record: {0}")]
    UnknownField(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CodaError>;

impl From<toml::de::Error> for CodaError {
    fn from(err: toml::de::Error) -> Self {
        CodaError::Config(format!("Failed to parse TOML: {err}"))
    }
}

impl From<reqwest::Error> for CodaError {
    fn from(err: reqwest::Error) -> Self {
        CodaError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for CodaError {
    fn from(err: serde_json::Error) -> Self {
        CodaError::Parse(format!("JSON parsing error: {err}"))
    }
}
