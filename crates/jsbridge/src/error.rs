//! Error types for the JavaScript bridge.

/// Errors that can end a bridge operation.
#[derive(Debug, thiserror::Error)]
pub enum JsError {
    /// Intentional abort; discarded by the guard without being reported.
    #[error("halt")]
    Halt,

    #[error("evaluation failed: {cause}")]
    Eval {
        cause: String,
        stack: Option<String>,
    },

    #[error("Failed to create runtime: {0}")]
    RuntimeCreation(String),

    #[error("no async runtime available to watch for scope cancellation")]
    NoAsyncRuntime,

    #[error("value nesting exceeds maximum depth of {0}")]
    DepthExceeded(usize),

    #[error("engine error: {0}")]
    Engine(#[from] rquickjs::Error),
}

impl JsError {
    /// Engine-provided stack trace, when the failure came from script.
    pub fn trace(&self) -> Option<&str> {
        match self {
            JsError::Eval { stack, .. } => stack.as_deref(),
            _ => None,
        }
    }
}

pub type JsResult<T> = Result<T, JsError>;

/// Errors raised while extracting host function arguments.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgError {
    #[error("missing required argument `{0}`")]
    Missing(&'static str),

    #[error("argument `{field}` should be {expected}, got {actual}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("unexpected argument `{0}`")]
    Unexpected(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
