//! Unified error type for the call-graph engine.

use thiserror::Error;

/// All errors that can escape a top-level request.
///
/// Conditions that only shrink the graph (an untypeable argument, an ambiguous
/// overload, an unindexed ancestor) are logged and never surface here.
#[derive(Error, Debug)]
pub enum GraphError {
    /// No declaration could be located for the requested identity
    #[error("Method declaration not found: {0}")]
    MethodNotFound(String),

    /// The identity string is not of the form `Type#name(T1,T2)`
    #[error("Invalid method identity '{0}': expected Type#name(ParamType,...)")]
    InvalidMethodId(String),

    /// I/O error (file read, directory access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// tree-sitter could not produce a tree for a source file
    #[error("Failed to parse {path}: {message}")]
    Parse {
        path: String,
        message: String,
    },

    /// A worker thread resolving a root method panicked
    #[error("Resolution of {0} aborted: worker thread panicked")]
    ResolutionPanicked(String),

    /// Directory does not exist
    #[error("Directory does not exist: {0}")]
    DirNotFound(String),

    /// Mutually exclusive flags or other argument validation error
    #[error("{0}")]
    InvalidArgs(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_found_display() {
        let err = GraphError::MethodNotFound("a.B#c()".to_string());
        assert!(err.to_string().contains("a.B#c()"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_invalid_method_id_display() {
        let err = GraphError::InvalidMethodId("nonsense".to_string());
        let msg = err.to_string();
        assert!(msg.contains("nonsense"));
        assert!(msg.contains("Type#name"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = GraphError::Parse {
            path: "src/main/java/A.java".to_string(),
            message: "parser returned no tree".to_string(),
        };
        assert!(err.to_string().contains("A.java"));
        assert!(err.to_string().contains("no tree"));
    }

    #[test]
    fn test_resolution_panicked_display() {
        let err = GraphError::ResolutionPanicked("demo.A#run()".to_string());
        let msg = err.to_string();
        assert!(msg.contains("demo.A#run()"));
        assert!(msg.contains("panicked"));
        assert!(!matches!(err, GraphError::InvalidArgs(_)));
    }

    #[test]
    fn test_io_error_from_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let graph_err: GraphError = io_err.into();
        assert!(matches!(graph_err, GraphError::Io(_)));
    }

    #[test]
    fn test_json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let graph_err: GraphError = json_err.into();
        assert!(graph_err.to_string().contains("JSON error"));
    }
}
