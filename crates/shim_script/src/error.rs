use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, evaluating or calling into scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("no script engine registered under '{name}'")]
    EngineNotFound { name: String },

    #[error("script evaluation failed: {message}")]
    Evaluation { message: String },

    #[error("cannot adapt {capability} from {scope} bindings: {reason}")]
    UnsupportedCapability {
        capability: String,
        scope: &'static str,
        reason: String,
    },

    #[error("script method '{method}' failed: {message}")]
    Invocation { method: String, message: String },

    #[error("script threw while reading a value: {message}")]
    Exception { message: String },

    #[error("cannot coerce {found} to {expected}")]
    Coercion { expected: &'static str, found: String },

    #[error("no binding named '{name}'")]
    UnknownBinding { name: String },

    #[error("no callable member named '{name}'")]
    NoSuchMethod { name: String },

    #[error("script object belongs to a different engine")]
    ForeignObject,

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Engine(#[from] rquickjs::Error),
}

pub type Result<T> = std::result::Result<T, ScriptError>;
