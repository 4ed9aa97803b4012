//! Predicates for pulling records and hashes out of a media group.

use std::collections::HashSet;

use mediadex_model::{NodeId, ServiceKey};
use serde::{Deserialize, Serialize};

use crate::record::MediaRecord;

/// Lifecycle predicate applied to single records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discriminant {
    Inbox,
    Archive,
    Local,
    LocalButNotInTrash,
    NotLocal,
    Downloading,
}

impl Discriminant {
    pub fn matches(&self, record: &MediaRecord) -> bool {
        let locations = record.locations();
        match self {
            Discriminant::Inbox => record.inbox(),
            Discriminant::Archive => !record.inbox(),
            Discriminant::Local => locations.is_local(),
            Discriminant::LocalButNotInTrash => locations.is_local() && !locations.is_trashed(),
            Discriminant::NotLocal => !locations.is_local(),
            Discriminant::Downloading => locations.is_downloading(),
        }
    }
}

/// Options for [`MediaGroup::generate_media_results`](super::MediaGroup::generate_media_results).
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub has_location: Option<ServiceKey>,
    pub discriminant: Option<Discriminant>,
    /// Only these nodes; a selected collection yields all its members.
    pub selected: Option<HashSet<NodeId>>,
    /// Only records without a rating on this service.
    pub unrated: Option<ServiceKey>,
    /// Skip mimes the viewer does not display.
    pub for_media_viewer: bool,
}

impl ResultFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_location(mut self, service_key: ServiceKey) -> Self {
        self.has_location = Some(service_key);
        self
    }

    pub fn discriminant(mut self, discriminant: Discriminant) -> Self {
        self.discriminant = Some(discriminant);
        self
    }

    pub fn selected(mut self, ids: impl IntoIterator<Item = NodeId>) -> Self {
        self.selected = Some(ids.into_iter().collect());
        self
    }

    pub fn unrated(mut self, service_key: ServiceKey) -> Self {
        self.unrated = Some(service_key);
        self
    }

    pub fn for_media_viewer(mut self) -> Self {
        self.for_media_viewer = true;
        self
    }
}

/// Options for [`MediaGroup::get_hashes`](super::MediaGroup::get_hashes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashFilter {
    pub has_location: Option<ServiceKey>,
    pub discriminant: Option<Discriminant>,
    /// Skip records already on this remote service.
    pub not_uploaded_to: Option<ServiceKey>,
}

impl HashFilter {
    pub fn is_unfiltered(&self) -> bool {
        self.has_location.is_none() && self.discriminant.is_none() && self.not_uploaded_to.is_none()
    }

    pub fn matches(&self, record: &MediaRecord) -> bool {
        if let Some(discriminant) = &self.discriminant
            && !discriminant.matches(record)
        {
            return false;
        }
        if let Some(service_key) = &self.has_location
            && !record.locations().is_current(service_key)
        {
            return false;
        }
        if let Some(service_key) = &self.not_uploaded_to
            && record.locations().current_remote().contains(service_key)
        {
            return false;
        }
        true
    }
}
