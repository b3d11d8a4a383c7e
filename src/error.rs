use thiserror::Error;

use crate::round::{ObjectId, RoundStatus};

#[derive(Error, Debug)]
pub enum GameError {
    #[error("operation `{operation}` is not valid while the round is {status:?}")]
    InvalidState {
        operation: &'static str,
        status: RoundStatus,
    },
    #[error("difficulty `{0}` is not in the catalog")]
    UnknownDifficulty(String),
    #[error("falling object {0:?} was already resolved")]
    DoubleResolution(ObjectId),
    #[error("difficulty `{key}` has an invalid `{field}`")]
    InvalidSettings { key: String, field: &'static str },
    #[cfg(feature = "serde_json")]
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}

impl GameError {
    pub(crate) fn invalid_state(operation: &'static str, status: RoundStatus) -> Self {
        GameError::InvalidState { operation, status }
    }
}
