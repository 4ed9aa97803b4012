use std::cell::RefCell;
use std::rc::Rc;

use mediadex_model::{
    ContentType, ContentUpdate, FileHash, FileMetadata, Mime, ServiceAction,
    ServiceKey, ServiceUpdate,
};
use tracing::{trace, warn};

use crate::error::Result;
use crate::locations::LocationState;
use crate::ratings::RatingState;
use crate::services::ServiceDirectory;
use crate::tags::TagState;

/// A record shared between a view and the nodes that display it.
pub type SharedRecord = Rc<RefCell<MediaRecord>>;

/// Everything the index knows about one file. Identity is the file hash.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRecord {
    file: FileMetadata,
    tags: TagState,
    locations: LocationState,
    ratings: RatingState,
}

impl MediaRecord {
    pub fn new(
        file: FileMetadata,
        tags: TagState,
        locations: LocationState,
        ratings: RatingState,
    ) -> Self {
        Self {
            file,
            tags,
            locations,
            ratings,
        }
    }

    pub fn from_file(file: FileMetadata) -> Self {
        Self::new(
            file,
            TagState::default(),
            LocationState::default(),
            RatingState::default(),
        )
    }

    pub fn with_tags(mut self, tags: TagState) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_locations(mut self, locations: LocationState) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_ratings(mut self, ratings: RatingState) -> Self {
        self.ratings = ratings;
        self
    }

    pub fn into_shared(self) -> SharedRecord {
        Rc::new(RefCell::new(self))
    }

    pub fn hash(&self) -> FileHash {
        self.file.hash()
    }

    pub fn file(&self) -> &FileMetadata {
        &self.file
    }

    pub fn mime(&self) -> Mime {
        self.file.mime()
    }

    pub fn tags(&self) -> &TagState {
        &self.tags
    }

    pub fn locations(&self) -> &LocationState {
        &self.locations
    }

    pub fn ratings(&self) -> &RatingState {
        &self.ratings
    }

    pub fn inbox(&self) -> bool {
        self.locations.inbox()
    }

    /// Swap in fresher file metadata for the same hash.
    pub fn refresh_file(&mut self, file: FileMetadata) {
        if file.hash() == self.file.hash() {
            self.file = file;
        }
    }

    /// Route an update to the sub-state matching the service's type.
    /// Updates that do not mention this record are ignored.
    pub fn process_content_update(
        &mut self,
        service_key: ServiceKey,
        update: &ContentUpdate,
        services: &dyn ServiceDirectory,
    ) -> Result<()> {
        let hash = self.hash();
        if !update.hashes().contains(&hash) {
            return Ok(());
        }

        if update.data_type == ContentType::Urls {
            return self.locations.process_content_update(service_key, update);
        }

        let Some(service_type) = services.service_type(&service_key) else {
            warn!(?service_key, ?hash, "content update for unknown service; skipping");
            return Ok(());
        };

        trace!(?service_key, ?hash, action = ?update.action, "applying content update");
        if service_type.is_tag() {
            self.tags.process_content_update(service_key, update)
        } else if service_type.is_file() {
            self.locations.process_content_update(service_key, update)
        } else {
            self.ratings.process_content_update(service_key, update)
        }
    }

    pub fn process_service_update(&mut self, update: &ServiceUpdate) {
        match update.action {
            ServiceAction::DeletePending => self.delete_pending(update.service_key),
            ServiceAction::Reset => self.reset_service(update.service_key),
        }
    }

    pub fn delete_pending(&mut self, service_key: ServiceKey) {
        self.tags.delete_pending(service_key);
        self.locations.delete_pending(service_key);
    }

    pub fn reset_service(&mut self, service_key: ServiceKey) {
        self.tags.reset_service(service_key);
        self.locations.reset_service(service_key);
        self.ratings.reset_service(service_key);
    }

    pub fn notify_siblings_changed(&mut self) {
        self.tags.notify_siblings_changed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::services::InMemoryServiceDirectory;
    use crate::siblings::NoSiblings;
    use mediadex_model::{ContentAction, ServiceInfo, ServiceType};

    fn record() -> MediaRecord {
        MediaRecord::from_file(
            FileMetadata::new(FileHash::of_content(b"rec"), Mime::ImageJpeg).with_size(10),
        )
    }

    #[test]
    fn routes_by_service_type() {
        let stars = ServiceKey::from_name("stars");
        let services = InMemoryServiceDirectory::new().with_service(ServiceInfo::new(
            stars,
            "stars",
            ServiceType::LocalRatingNumerical,
        ));
        let mut record = record();
        let hash = record.hash();

        record
            .process_content_update(
                ServiceKey::LOCAL_TAG,
                &ContentUpdate::mapping(ContentAction::Add, "blue", [hash]).unwrap(),
                &services,
            )
            .unwrap();
        record
            .process_content_update(
                ServiceKey::LOCAL_FILE,
                &ContentUpdate::add_files([hash], 5),
                &services,
            )
            .unwrap();
        record
            .process_content_update(stars, &ContentUpdate::rating(Some(0.5), [hash]), &services)
            .unwrap();

        assert!(record.tags().has_tag("blue", &NoSiblings));
        assert!(record.locations().is_local());
        assert_eq!(record.ratings().rating(&stars), Some(0.5));
    }

    #[test]
    fn ignores_other_hashes_and_unknown_services() {
        let services = InMemoryServiceDirectory::new();
        let mut record = record();
        let before = record.clone();

        let other = FileHash::of_content(b"other");
        record
            .process_content_update(
                ServiceKey::LOCAL_TAG,
                &ContentUpdate::mapping(ContentAction::Add, "x", [other]).unwrap(),
                &services,
            )
            .unwrap();
        record
            .process_content_update(
                ServiceKey::from_name("gone"),
                &ContentUpdate::mapping(ContentAction::Add, "x", [record.hash()]).unwrap(),
                &services,
            )
            .unwrap();
        assert_eq!(record, before);
    }

    #[test]
    fn mismatched_content_for_service_type_is_an_error() {
        let services = InMemoryServiceDirectory::new();
        let mut record = record();
        let update = ContentUpdate::files(ContentAction::Archive, [record.hash()]).unwrap();
        let err = record
            .process_content_update(ServiceKey::LOCAL_TAG, &update, &services)
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidContentUpdate { .. }));
    }

    #[test]
    fn service_updates() {
        let services = InMemoryServiceDirectory::new();
        let mut record = record();
        let hash = record.hash();
        record
            .process_content_update(
                ServiceKey::LOCAL_TAG,
                &ContentUpdate::mapping(ContentAction::Pend, "p", [hash]).unwrap(),
                &services,
            )
            .unwrap();
        record.process_service_update(&ServiceUpdate::new(
            ServiceKey::LOCAL_TAG,
            ServiceAction::DeletePending,
        ));
        assert!(record.tags().pending(&NoSiblings).is_empty());
    }
}
