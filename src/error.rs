//! Runtime error taxonomy.
//!
//! Configuration errors (a document reference the validator should have
//! caught) and invariant violations (a bad tick delta) are fatal to the
//! current run: the runtime enters [`RunState::Stopped`] and the error is
//! returned to the host. Type coercion and queue/sequencer edge cases are
//! never errors.
//!
//! [`RunState::Stopped`]: crate::resources::runstate::RunState::Stopped

use thiserror::Error;

use crate::project::Scope;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown {scope} variable `{id}`")]
    UnknownVariable { scope: Scope, id: String },
    #[error("unknown object `{0}`")]
    UnknownObject(String),
    #[error("unknown sprite `{0}`")]
    UnknownSprite(String),
    #[error("unknown room `{0}`")]
    UnknownRoom(String),
    #[error("negative tick delta: {0}ms")]
    NegativeDelta(f64),
    #[error("tick delta is not a finite number")]
    NonFiniteDelta,
    #[error("invalid project document: {0}")]
    Document(#[from] serde_json::Error),
    #[error("failed to read project document: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// Whether the error is an external-contract violation in the document.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RuntimeError::UnknownVariable { .. }
                | RuntimeError::UnknownObject(_)
                | RuntimeError::UnknownSprite(_)
                | RuntimeError::UnknownRoom(_)
        )
    }
}
