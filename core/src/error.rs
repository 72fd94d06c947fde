use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Not enough timber: need {needed}, have {available:.2}")]
    InsufficientResources { needed: f64, available: f64 },

    #[error("Building '{id}' not found")]
    NotFound { id: String },

    #[error("Building '{id}' is already at the highest level")]
    MaxLevel { id: String },

    #[error("No saved game in slot '{slot}'")]
    NoSavedState { slot: String },

    #[error("Saved game is corrupt: {reason}")]
    CorruptSave { reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn corrupt(reason: impl Into<String>) -> Self {
        SimError::CorruptSave { reason: reason.into() }
    }

    /// Gameplay rejections the player can recover from. Everything else
    /// is an infrastructure failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::InsufficientResources { .. }
                | SimError::NotFound { .. }
                | SimError::MaxLevel { .. }
                | SimError::NoSavedState { .. }
                | SimError::CorruptSave { .. }
        )
    }
}

pub type SimResult<T> = Result<T, SimError>;
