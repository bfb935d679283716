//! Error types for the tile engine and round controller.

/// Errors that can occur while moving tiles or setting up a round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The tile set breaks a board invariant. This is a caller bug.
    #[error("invalid board state: {message}")]
    InvalidState { message: String },

    /// A direction name or code that does not map to a swipe.
    #[error("unknown direction: {0:?}")]
    UnknownDirection(String),

    #[error("invalid game config: {message}")]
    InvalidConfig { message: String },
}

impl GameError {
    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
