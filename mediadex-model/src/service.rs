use std::fmt::{self, Display, Formatter};

use crate::ids::ServiceKey;

/// What kind of content a service provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ServiceType {
    LocalFileDomain,
    LocalFileTrashDomain,
    CombinedLocalFile,
    CombinedFile,
    FileRepository,
    Ipfs,
    LocalTag,
    TagRepository,
    CombinedTag,
    LocalRatingLike,
    LocalRatingNumerical,
}

impl ServiceType {
    pub fn is_tag(&self) -> bool {
        matches!(
            self,
            ServiceType::LocalTag
                | ServiceType::TagRepository
                | ServiceType::CombinedTag
        )
    }

    /// Services that can appear in a record's location state.
    pub fn is_file(&self) -> bool {
        matches!(
            self,
            ServiceType::LocalFileDomain
                | ServiceType::LocalFileTrashDomain
                | ServiceType::CombinedLocalFile
                | ServiceType::CombinedFile
                | ServiceType::FileRepository
                | ServiceType::Ipfs
        )
    }

    pub fn is_rating(&self) -> bool {
        matches!(
            self,
            ServiceType::LocalRatingLike | ServiceType::LocalRatingNumerical
        )
    }

    /// File services living on another machine.
    pub fn is_remote_file(&self) -> bool {
        matches!(self, ServiceType::FileRepository | ServiceType::Ipfs)
    }

    /// Aggregate pseudo-services that no content update targets directly.
    pub fn is_combined(&self) -> bool {
        matches!(
            self,
            ServiceType::CombinedFile
                | ServiceType::CombinedLocalFile
                | ServiceType::CombinedTag
        )
    }
}

impl Display for ServiceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceType::LocalFileDomain => "local file domain",
            ServiceType::LocalFileTrashDomain => "local trash",
            ServiceType::CombinedLocalFile => "all local files",
            ServiceType::CombinedFile => "all known files",
            ServiceType::FileRepository => "file repository",
            ServiceType::Ipfs => "ipfs daemon",
            ServiceType::LocalTag => "local tag service",
            ServiceType::TagRepository => "tag repository",
            ServiceType::CombinedTag => "all known tags",
            ServiceType::LocalRatingLike => "like/dislike rating service",
            ServiceType::LocalRatingNumerical => "numerical rating service",
        };
        f.write_str(label)
    }
}

/// Name and type of a service, as reported by the service directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceInfo {
    pub key: ServiceKey,
    pub name: String,
    pub service_type: ServiceType,
}

impl ServiceInfo {
    pub fn new(
        key: ServiceKey,
        name: impl Into<String>,
        service_type: ServiceType,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            service_type,
        }
    }

    /// The services every client starts with.
    pub fn well_known() -> Vec<ServiceInfo> {
        vec![
            ServiceInfo::new(
                ServiceKey::LOCAL_FILE,
                "my files",
                ServiceType::LocalFileDomain,
            ),
            ServiceInfo::new(
                ServiceKey::TRASH,
                "trash",
                ServiceType::LocalFileTrashDomain,
            ),
            ServiceInfo::new(
                ServiceKey::COMBINED_LOCAL_FILE,
                "all local files",
                ServiceType::CombinedLocalFile,
            ),
            ServiceInfo::new(
                ServiceKey::COMBINED_FILE,
                "all known files",
                ServiceType::CombinedFile,
            ),
            ServiceInfo::new(
                ServiceKey::LOCAL_TAG,
                "my tags",
                ServiceType::LocalTag,
            ),
            ServiceInfo::new(
                ServiceKey::COMBINED_TAG,
                "all known tags",
                ServiceType::CombinedTag,
            ),
        ]
    }
}
