//! Shared fixtures for mediadex-core integration tests.
//!
//! Every test binary gets the same service layout: the well-known local
//! services plus a tag repository, a file repository and two rating services.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mediadex_core::sorting::{SortOrder, SortSpec, SystemSort};
use mediadex_core::tags::StatusesToTags;
use mediadex_core::{
    IndexContext, InMemoryServiceDirectory, LocationState, MediaGroup, MediaRecord,
    NoSiblings, RatingState, TagState, ViewOptions,
};
use mediadex_model::{
    ContentStatus, FileHash, FileMetadata, Mime, ServiceInfo, ServiceKey, ServiceType,
};

pub const TAG_REPO: ServiceKey = ServiceKey::from_name("public tag repository");
pub const FILE_REPO: ServiceKey = ServiceKey::from_name("file repository");
pub const FAVOURITES: ServiceKey = ServiceKey::from_name("favourites");
pub const STARS: ServiceKey = ServiceKey::from_name("stars");

pub fn services() -> InMemoryServiceDirectory {
    InMemoryServiceDirectory::new()
        .with_service(ServiceInfo::new(TAG_REPO, "public tag repository", ServiceType::TagRepository))
        .with_service(ServiceInfo::new(FILE_REPO, "file repository", ServiceType::FileRepository))
        .with_service(ServiceInfo::new(FAVOURITES, "favourites", ServiceType::LocalRatingLike))
        .with_service(ServiceInfo::new(STARS, "stars", ServiceType::LocalRatingNumerical))
}

pub fn context_with(options: ViewOptions) -> Arc<IndexContext> {
    IndexContext::new(Arc::new(services()), Arc::new(NoSiblings), options)
}

pub fn context() -> Arc<IndexContext> {
    context_with(ViewOptions::default())
}

pub fn hash(seed: &str) -> FileHash {
    FileHash::of_content(seed.as_bytes())
}

pub fn by_size(order: SortOrder) -> SortSpec {
    SortSpec::system(SystemSort::FileSize, order)
}

/// Sizes of the top-level nodes in display order.
pub fn sizes(group: &MediaGroup) -> Vec<u64> {
    group.nodes().iter().map(|node| node.size()).collect()
}

/// Hashes of every file in display order.
pub fn order(group: &MediaGroup) -> Vec<FileHash> {
    group.flat_media().iter().map(|singleton| singleton.hash()).collect()
}

/// Builds a [`MediaRecord`] that lives in the local file domain unless told
/// otherwise.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    hash: FileHash,
    mime: Mime,
    size: Option<u64>,
    resolution: Option<(u32, u32)>,
    duration_ms: Option<u64>,
    tags: HashMap<ServiceKey, StatusesToTags>,
    current: HashSet<ServiceKey>,
    pending: HashSet<ServiceKey>,
    inbox: bool,
    timestamps: Vec<(ServiceKey, i64)>,
    ratings: HashMap<ServiceKey, f64>,
}

impl RecordBuilder {
    pub fn new(seed: &str) -> Self {
        Self {
            hash: hash(seed),
            mime: Mime::ImageJpeg,
            size: Some(1_000),
            resolution: None,
            duration_ms: None,
            tags: HashMap::new(),
            current: HashSet::from([ServiceKey::LOCAL_FILE, ServiceKey::COMBINED_LOCAL_FILE]),
            pending: HashSet::new(),
            inbox: false,
            timestamps: Vec::new(),
            ratings: HashMap::new(),
        }
    }

    pub fn mime(mut self, mime: Mime) -> Self {
        self.mime = mime;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn no_size(mut self) -> Self {
        self.size = None;
        self
    }

    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// A current tag on the local tag service.
    pub fn tag(self, tag: &str) -> Self {
        self.tag_on(ServiceKey::LOCAL_TAG, ContentStatus::Current, tag)
    }

    pub fn tag_on(mut self, service_key: ServiceKey, status: ContentStatus, tag: &str) -> Self {
        self.tags
            .entry(service_key)
            .or_default()
            .get_mut(status)
            .insert(tag.to_string());
        self
    }

    /// Also current in `service_key`.
    pub fn also_in(mut self, service_key: ServiceKey) -> Self {
        self.current.insert(service_key);
        self
    }

    /// Only current in `service_key`.
    pub fn only_in(mut self, service_key: ServiceKey) -> Self {
        self.current = HashSet::from([service_key]);
        self
    }

    pub fn pending_to(mut self, service_key: ServiceKey) -> Self {
        self.pending.insert(service_key);
        self
    }

    pub fn inbox(mut self) -> Self {
        self.inbox = true;
        self
    }

    pub fn imported_at(mut self, timestamp: i64) -> Self {
        self.timestamps.push((ServiceKey::COMBINED_LOCAL_FILE, timestamp));
        self
    }

    pub fn timestamp(mut self, service_key: ServiceKey, timestamp: i64) -> Self {
        self.timestamps.push((service_key, timestamp));
        self
    }

    pub fn rating(mut self, service_key: ServiceKey, value: f64) -> Self {
        self.ratings.insert(service_key, value);
        self
    }

    pub fn build(self) -> MediaRecord {
        let mut file = FileMetadata::new(self.hash, self.mime);
        if let Some(size) = self.size {
            file = file.with_size(size);
        }
        if let Some((width, height)) = self.resolution {
            file = file.with_resolution(width, height);
        }
        if let Some(duration_ms) = self.duration_ms {
            file = file.with_duration_ms(duration_ms);
        }

        let mut locations = LocationState::new(
            self.current,
            HashSet::new(),
            self.pending,
            HashSet::new(),
        )
        .with_inbox(self.inbox);
        for (service_key, timestamp) in self.timestamps {
            locations = locations.with_timestamp(service_key, timestamp);
        }

        MediaRecord::from_file(file)
            .with_tags(TagState::new(self.tags))
            .with_locations(locations)
            .with_ratings(RatingState::new(self.ratings))
    }
}
