use thiserror::Error;

/// Error type for everything around a search that can fail loudly.
///
/// The search itself never returns one of these: an unreachable goal, a broken
/// predecessor chain and a racing lookup miss all degrade to "no path found".
/// Only setup work (configuration, maze construction, runtime creation) errors.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Invalid solver configuration
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
    },

    /// Configuration could not be decoded
    #[error("Serialization failed: {format}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// ASCII maze could not be parsed
    #[error("Maze parse error at line {line}: {message}")]
    MazeParse { line: usize, message: String },

    /// The async runtime could not be built
    #[error("Runtime operation failed: {operation}")]
    Runtime {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl SolverError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            field: None,
        }
    }

    /// Create a configuration error naming the offending field
    pub fn configuration_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Configuration {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        format: S,
        source: E,
    ) -> Self {
        Self::Serialization {
            format: format.into(),
            source: Box::new(source),
        }
    }

    /// Create a maze parse error
    pub fn maze_parse<S: Into<String>>(line: usize, message: S) -> Self {
        Self::MazeParse {
            line,
            message: message.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime<S: Into<String>>(operation: S, source: std::io::Error) -> Self {
        Self::Runtime {
            operation: operation.into(),
            source,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Serialization { .. } => "serialization",
            Self::MazeParse { .. } => "maze",
            Self::Runtime { .. } => "runtime",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SolverError>;

impl From<serde_json::Error> for SolverError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("json", err)
    }
}

impl From<serde_yaml::Error> for SolverError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::serialization("yaml", err)
    }
}
