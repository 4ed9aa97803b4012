use std::collections::HashSet;
use std::sync::Arc;

use mediadex_model::{ContentUpdate, FileHash, NodeId, ServiceKey};

use super::group::MediaGroup;
use super::node::MediaSingleton;
use crate::context::IndexContext;
use crate::error::Result;
use crate::locations::LocationState;
use crate::ratings::RatingState;
use crate::sorting::SortSpec;
use crate::tags::TagState;

/// Aggregates recomputed from the members after every change.
#[derive(Debug, Clone, Default)]
struct Summary {
    inbox: bool,
    archive: bool,
    size: u64,
    size_definite: bool,
    duration_ms: Option<u64>,
    num_frames: Option<u64>,
    num_words: Option<u64>,
    tags: TagState,
    locations: LocationState,
    ratings: RatingState,
}

/// A group of records shown as one node.
#[derive(Debug)]
pub struct MediaCollection {
    id: NodeId,
    members: MediaGroup,
    summary: Summary,
}

impl MediaCollection {
    pub fn new(
        ctx: Arc<IndexContext>,
        file_service_key: ServiceKey,
        singletons: Vec<MediaSingleton>,
        sort: SortSpec,
    ) -> Self {
        let mut members = MediaGroup::new(ctx, file_service_key);
        members.add_media(singletons, true);
        members.sort(Some(sort));

        let mut collection = Self {
            id: NodeId::new(),
            members,
            summary: Summary::default(),
        };
        collection.recalc();
        collection
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn members(&self) -> &MediaGroup {
        &self.members
    }

    pub fn size(&self) -> u64 {
        self.summary.size
    }

    pub fn is_size_definite(&self) -> bool {
        self.summary.size_definite
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.summary.duration_ms
    }

    pub fn num_frames(&self) -> Option<u64> {
        self.summary.num_frames
    }

    pub fn num_words(&self) -> Option<u64> {
        self.summary.num_words
    }

    /// At least one member is in the inbox.
    pub fn has_inbox(&self) -> bool {
        self.summary.inbox
    }

    /// Every member is archived.
    pub fn has_archive(&self) -> bool {
        self.summary.archive
    }

    pub fn tags(&self) -> &TagState {
        &self.summary.tags
    }

    pub fn locations(&self) -> &LocationState {
        &self.summary.locations
    }

    pub fn ratings(&self) -> &RatingState {
        &self.summary.ratings
    }

    pub(crate) fn add_media(&mut self, singletons: Vec<MediaSingleton>) {
        self.members.add_media(singletons, true);
        self.members.sort(None);
        self.recalc();
    }

    pub(crate) fn remove_media_by_hashes(&mut self, hashes: &HashSet<FileHash>) {
        self.members.remove_media_by_hashes(hashes);
        self.recalc();
    }

    pub(crate) fn process_content_update(
        &mut self,
        service_key: ServiceKey,
        update: &ContentUpdate,
    ) -> Result<()> {
        self.members.process_content_update(service_key, update)?;
        self.recalc();
        Ok(())
    }

    pub(crate) fn delete_pending(&mut self, service_key: ServiceKey) {
        self.members.delete_pending(service_key);
        self.recalc();
    }

    pub(crate) fn reset_service(&mut self, service_key: ServiceKey) {
        self.members.reset_service(service_key);
        self.recalc();
    }

    pub(crate) fn notify_siblings_changed(&mut self) {
        self.members.notify_siblings_changed();
        self.summary.tags.notify_siblings_changed();
    }

    pub(crate) fn sort(&mut self, sort: Option<SortSpec>) {
        self.members.sort(sort);
    }

    /// Dissolve into singletons, keeping their identities.
    pub(crate) fn into_singletons(self) -> Vec<MediaSingleton> {
        self.members.into_singletons()
    }

    pub(crate) fn recalc(&mut self) {
        let nodes = self.members.nodes();

        let mut summary = Summary {
            archive: true,
            size_definite: true,
            ..Summary::default()
        };
        let mut duration = 0;
        let mut frames = None::<u64>;
        let mut words = None::<u64>;

        for node in nodes {
            summary.inbox |= node.has_inbox();
            summary.archive &= node.has_archive();
            summary.size += node.size();
            summary.size_definite &= node.is_size_definite();
            duration += node.duration_ms().unwrap_or(0);
            if let Some(count) = node.num_frames() {
                *frames.get_or_insert(0) += count;
            }
            if let Some(count) = node.num_words() {
                *words.get_or_insert(0) += count;
            }
        }
        summary.duration_ms = (duration > 0).then_some(duration);
        summary.num_frames = frames;
        summary.num_words = words;

        let tag_states: Vec<TagState> = nodes.iter().map(|n| n.with_tags(TagState::clone)).collect();
        summary.tags = TagState::merge(&tag_states);

        let location_states: Vec<LocationState> = nodes
            .iter()
            .map(|n| n.with_locations(LocationState::clone))
            .collect();
        summary.locations = LocationState::intersect(&location_states);

        summary.ratings = nodes
            .first()
            .map(|n| n.with_ratings(RatingState::clone))
            .unwrap_or_default();

        if nodes.is_empty() {
            summary.archive = false;
        }
        self.summary = summary;
    }
}
