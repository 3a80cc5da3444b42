use thiserror::Error;

/// Errors related to scoped state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("no render pass in progress: call `Session::begin_pass` before creating widgets")]
    NoActivePass,
    #[error("invalid instance key `{key}`: {reason}")]
    InvalidInstanceKey { key: String, reason: &'static str },
    #[error("namespace `{0}` is already used by another widget in this pass")]
    DuplicateNamespace(String),
    #[error("type mismatch for `{key}`: expected `{expected}`")]
    TypeMismatch { key: String, expected: &'static str },
    #[error("the session store is already borrowed by `Session::with_store`")]
    StoreBusy,
    /// Error raised by the session store itself.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T, E = StateError> = std::result::Result<T, E>;
