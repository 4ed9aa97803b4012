use mediadex_model::{ContentAction, ContentType, ContentUpdate, ModelError, ServiceKey};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Item not found in sorted index: {0}")]
    MissingItem(String),

    #[error("Invalid content update ({data_type:?}, {action:?}): {reason}")]
    InvalidContentUpdate {
        data_type: ContentType,
        action: ContentAction,
        reason: String,
    },

    #[error("Unknown service: {0:?}")]
    UnknownService(ServiceKey),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Media source error: {0}")]
    Source(#[from] anyhow::Error),
}

impl IndexError {
    pub(crate) fn invalid_update(
        update: &ContentUpdate,
        reason: impl Into<String>,
    ) -> Self {
        IndexError::InvalidContentUpdate {
            data_type: update.data_type,
            action: update.action,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexError>;
