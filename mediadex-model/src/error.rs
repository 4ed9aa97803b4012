use std::fmt::{self, Display};

use crate::content::{ContentAction, ContentType};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidKey(String),
    InvalidContentUpdate {
        data_type: ContentType,
        action: ContentAction,
        reason: &'static str,
    },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidKey(msg) => write!(f, "invalid key: {msg}"),
            ModelError::InvalidContentUpdate {
                data_type,
                action,
                reason,
            } => write!(
                f,
                "invalid content update ({data_type:?}, {action:?}): {reason}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
