//! Typed mutations delivered to the index by the storage layer.

use std::collections::BTreeSet;

use crate::error::{ModelError, Result};
use crate::ids::{FileHash, ServiceKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContentType {
    Files,
    Tags,
    Urls,
    Ratings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContentAction {
    Add,
    Delete,
    Undelete,
    Pend,
    Petition,
    RescindPend,
    RescindPetition,
    Archive,
    Inbox,
}

/// Lifecycle status of a tag or file membership relative to one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContentStatus {
    Current,
    Deleted,
    Pending,
    Petitioned,
}

impl ContentStatus {
    pub const ALL: [ContentStatus; 4] = [
        ContentStatus::Current,
        ContentStatus::Deleted,
        ContentStatus::Pending,
        ContentStatus::Petitioned,
    ];
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ContentPayload {
    Files {
        hashes: BTreeSet<FileHash>,
        /// When the change happened, seconds since the epoch.
        timestamp: Option<i64>,
        reason: Option<String>,
    },
    Mappings {
        tag: String,
        hashes: BTreeSet<FileHash>,
        reason: Option<String>,
    },
    Urls {
        urls: BTreeSet<String>,
        hashes: BTreeSet<FileHash>,
    },
    Ratings {
        rating: Option<f64>,
        hashes: BTreeSet<FileHash>,
    },
}

impl ContentPayload {
    pub fn hashes(&self) -> &BTreeSet<FileHash> {
        match self {
            ContentPayload::Files { hashes, .. }
            | ContentPayload::Mappings { hashes, .. }
            | ContentPayload::Urls { hashes, .. }
            | ContentPayload::Ratings { hashes, .. } => hashes,
        }
    }

    fn content_type(&self) -> ContentType {
        match self {
            ContentPayload::Files { .. } => ContentType::Files,
            ContentPayload::Mappings { .. } => ContentType::Tags,
            ContentPayload::Urls { .. } => ContentType::Urls,
            ContentPayload::Ratings { .. } => ContentType::Ratings,
        }
    }
}

/// One mutation against one service.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentUpdate {
    pub data_type: ContentType,
    pub action: ContentAction,
    pub payload: ContentPayload,
}

impl ContentUpdate {
    /// Build an update, rejecting combinations no service ever emits.
    pub fn new(
        data_type: ContentType,
        action: ContentAction,
        payload: ContentPayload,
    ) -> Result<Self> {
        let update = Self {
            data_type,
            action,
            payload,
        };
        update.validate()?;
        Ok(update)
    }

    pub fn files(
        action: ContentAction,
        hashes: impl IntoIterator<Item = FileHash>,
    ) -> Result<Self> {
        Self::new(
            ContentType::Files,
            action,
            ContentPayload::Files {
                hashes: hashes.into_iter().collect(),
                timestamp: None,
                reason: None,
            },
        )
    }

    /// A file landing in a file service at `timestamp`.
    pub fn add_files(
        hashes: impl IntoIterator<Item = FileHash>,
        timestamp: i64,
    ) -> Self {
        Self {
            data_type: ContentType::Files,
            action: ContentAction::Add,
            payload: ContentPayload::Files {
                hashes: hashes.into_iter().collect(),
                timestamp: Some(timestamp),
                reason: None,
            },
        }
    }

    pub fn mapping(
        action: ContentAction,
        tag: impl Into<String>,
        hashes: impl IntoIterator<Item = FileHash>,
    ) -> Result<Self> {
        Self::new(
            ContentType::Tags,
            action,
            ContentPayload::Mappings {
                tag: tag.into(),
                hashes: hashes.into_iter().collect(),
                reason: None,
            },
        )
    }

    pub fn urls(
        action: ContentAction,
        urls: impl IntoIterator<Item = String>,
        hash: FileHash,
    ) -> Result<Self> {
        Self::new(
            ContentType::Urls,
            action,
            ContentPayload::Urls {
                urls: urls.into_iter().collect(),
                hashes: BTreeSet::from([hash]),
            },
        )
    }

    /// Set (or clear, with `None`) a rating on some files.
    pub fn rating(
        rating: Option<f64>,
        hashes: impl IntoIterator<Item = FileHash>,
    ) -> Self {
        Self {
            data_type: ContentType::Ratings,
            action: ContentAction::Add,
            payload: ContentPayload::Ratings {
                rating,
                hashes: hashes.into_iter().collect(),
            },
        }
    }

    pub fn hashes(&self) -> &BTreeSet<FileHash> {
        self.payload.hashes()
    }

    pub fn is_file_deletion(&self) -> bool {
        self.data_type == ContentType::Files
            && self.action == ContentAction::Delete
    }

    /// Check that the payload shape and action fit the declared content type.
    pub fn validate(&self) -> Result<()> {
        use ContentAction::*;

        let invalid = |reason| ModelError::InvalidContentUpdate {
            data_type: self.data_type,
            action: self.action,
            reason,
        };

        if self.payload.content_type() != self.data_type {
            return Err(invalid("payload does not match content type"));
        }

        let allowed = match self.data_type {
            ContentType::Files => true,
            ContentType::Tags => matches!(
                self.action,
                Add | Delete | Pend | Petition | RescindPend | RescindPetition
            ),
            ContentType::Urls => matches!(self.action, Add | Delete),
            ContentType::Ratings => matches!(self.action, Add),
        };

        if allowed {
            Ok(())
        } else {
            Err(invalid("action not supported for content type"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ServiceAction {
    /// Drop every pending and petitioned entry for the service.
    DeletePending,
    /// Forget everything the service ever said.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceUpdate {
    pub service_key: ServiceKey,
    pub action: ServiceAction,
}

impl ServiceUpdate {
    pub fn new(service_key: ServiceKey, action: ServiceAction) -> Self {
        Self {
            service_key,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_payload_that_does_not_match_type() {
        let hash = FileHash::of_content(b"x");
        let err = ContentUpdate::new(
            ContentType::Files,
            ContentAction::Add,
            ContentPayload::Mappings {
                tag: "blue".into(),
                hashes: BTreeSet::from([hash]),
                reason: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::InvalidContentUpdate { .. }));
    }

    #[test]
    fn rejects_actions_a_content_type_never_carries() {
        let hash = FileHash::of_content(b"x");
        assert!(ContentUpdate::mapping(ContentAction::Archive, "a", [hash]).is_err());
        assert!(
            ContentUpdate::urls(ContentAction::Pend, ["u".to_string()], hash)
                .is_err()
        );
        assert!(ContentUpdate::mapping(ContentAction::Pend, "a", [hash]).is_ok());
        assert!(ContentUpdate::files(ContentAction::Inbox, [hash]).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn content_update_serde_shape() {
        let hash = FileHash::of_content(b"x");
        let update = ContentUpdate::mapping(ContentAction::Add, "blue", [hash])
            .unwrap();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["data_type"], "tags");
        assert_eq!(json["payload"]["kind"], "mappings");
        let back: ContentUpdate = serde_json::from_value(json).unwrap();
        assert_eq!(back, update);
    }
}
