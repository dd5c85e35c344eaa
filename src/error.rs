//! Load-failure types for the graph-producing collaborator
//!
//! The engine itself never fails once a graph is loaded; the only fallible
//! boundary is the upstream loader that produces `GraphData`. Its failures
//! surface as a `LoadError` and prevent the simulation loop from starting.

use thiserror::Error;

/// Errors reported by the graph-producing collaborator
#[derive(Error, Debug)]
pub enum LoadError {
    /// The upstream source could not be read (fetch, file, database)
    #[error("load error: {0}")]
    Source(String),

    /// The source was read but its content could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for load operations
pub type LoadResult<T> = Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_display() {
        let err = LoadError::Source("connection refused".to_string());
        assert_eq!(err.to_string(), "load error: connection refused");
    }

    #[test]
    fn parse_error_wraps_serde_json() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json");
        let err = LoadError::from(bad.unwrap_err());
        assert!(err.to_string().starts_with("parse error:"));
    }
}
