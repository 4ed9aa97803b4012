//! Which file services carry a record, and the local lifecycle derived from
//! that membership.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Utc;
use mediadex_model::{
    ContentAction, ContentPayload, ContentStatus, ContentType, ContentUpdate,
    ServiceKey, ServiceType,
};

use crate::error::{IndexError, Result};
use crate::services::ServiceDirectory;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationState {
    current: HashSet<ServiceKey>,
    deleted: HashSet<ServiceKey>,
    pending: HashSet<ServiceKey>,
    petitioned: HashSet<ServiceKey>,
    inbox: bool,
    urls: BTreeSet<String>,
    filenames: HashMap<ServiceKey, String>,
    timestamps: HashMap<ServiceKey, i64>,
}

impl LocationState {
    pub fn new(
        current: HashSet<ServiceKey>,
        deleted: HashSet<ServiceKey>,
        pending: HashSet<ServiceKey>,
        petitioned: HashSet<ServiceKey>,
    ) -> Self {
        Self {
            current,
            deleted,
            pending,
            petitioned,
            ..Self::default()
        }
    }

    pub fn with_inbox(mut self, inbox: bool) -> Self {
        self.inbox = inbox;
        self
    }

    pub fn with_timestamp(mut self, service_key: ServiceKey, timestamp: i64) -> Self {
        self.timestamps.insert(service_key, timestamp);
        self
    }

    pub fn with_urls(mut self, urls: impl IntoIterator<Item = String>) -> Self {
        self.urls.extend(urls);
        self
    }

    pub fn with_filename(mut self, service_key: ServiceKey, filename: impl Into<String>) -> Self {
        self.filenames.insert(service_key, filename.into());
        self
    }

    /// Membership intersected across several states. Inbox, urls and
    /// timestamps are not carried over.
    pub fn intersect<'a>(states: impl IntoIterator<Item = &'a LocationState>) -> LocationState {
        let mut states = states.into_iter();
        let Some(first) = states.next() else {
            return LocationState::default();
        };

        let mut merged = LocationState::new(
            first.current.clone(),
            first.deleted.clone(),
            first.pending.clone(),
            first.petitioned.clone(),
        );
        for state in states {
            merged.current.retain(|key| state.current.contains(key));
            merged.deleted.retain(|key| state.deleted.contains(key));
            merged.pending.retain(|key| state.pending.contains(key));
            merged.petitioned.retain(|key| state.petitioned.contains(key));
        }
        merged
    }

    pub fn process_content_update(
        &mut self,
        service_key: ServiceKey,
        update: &ContentUpdate,
    ) -> Result<()> {
        match (update.data_type, &update.payload) {
            (ContentType::Files, ContentPayload::Files { timestamp, .. }) => {
                let now = timestamp.unwrap_or_else(|| Utc::now().timestamp());
                self.apply_file_action(service_key, update, now)
            }
            (ContentType::Urls, ContentPayload::Urls { urls, .. }) => match update.action {
                ContentAction::Add => {
                    self.urls.extend(urls.iter().cloned());
                    Ok(())
                }
                ContentAction::Delete => {
                    self.urls.retain(|url| !urls.contains(url));
                    Ok(())
                }
                _ => Err(IndexError::invalid_update(update, "urls only support add and delete")),
            },
            _ => Err(IndexError::invalid_update(
                update,
                "location state only accepts file and url updates",
            )),
        }
    }

    fn apply_file_action(
        &mut self,
        service_key: ServiceKey,
        update: &ContentUpdate,
        now: i64,
    ) -> Result<()> {
        match update.action {
            ContentAction::Archive => self.inbox = false,
            ContentAction::Inbox => self.inbox = true,
            ContentAction::Add => {
                let newly_current = self.current.insert(service_key);
                self.deleted.remove(&service_key);
                self.pending.remove(&service_key);

                if service_key == ServiceKey::LOCAL_FILE {
                    self.current.remove(&ServiceKey::TRASH);
                    self.timestamps.remove(&ServiceKey::TRASH);
                    self.pending.remove(&ServiceKey::COMBINED_LOCAL_FILE);

                    if self.current.insert(ServiceKey::COMBINED_LOCAL_FILE) {
                        self.inbox = true;
                        self.timestamps.insert(ServiceKey::COMBINED_LOCAL_FILE, now);
                    }
                }

                // A repeated add keeps the time the file first arrived.
                if newly_current {
                    self.timestamps.insert(service_key, now);
                }
            }
            ContentAction::Delete => {
                self.deleted.insert(service_key);
                self.current.remove(&service_key);
                self.petitioned.remove(&service_key);
                self.timestamps.remove(&service_key);

                if service_key == ServiceKey::LOCAL_FILE {
                    if self.current.insert(ServiceKey::TRASH) {
                        self.timestamps.insert(ServiceKey::TRASH, now);
                    }
                } else if service_key == ServiceKey::TRASH {
                    self.inbox = false;
                    self.current.remove(&ServiceKey::COMBINED_LOCAL_FILE);
                    self.timestamps.remove(&ServiceKey::COMBINED_LOCAL_FILE);
                }
            }
            ContentAction::Undelete => {
                self.current.remove(&ServiceKey::TRASH);
                self.timestamps.remove(&ServiceKey::TRASH);
                self.deleted.remove(&ServiceKey::LOCAL_FILE);
                if self.current.insert(ServiceKey::LOCAL_FILE) {
                    self.timestamps.insert(ServiceKey::LOCAL_FILE, now);
                }
            }
            ContentAction::Pend => {
                if !self.current.contains(&service_key) {
                    self.pending.insert(service_key);
                }
            }
            ContentAction::Petition => {
                if !self.deleted.contains(&service_key) {
                    self.petitioned.insert(service_key);
                }
            }
            ContentAction::RescindPend => {
                self.pending.remove(&service_key);
            }
            ContentAction::RescindPetition => {
                self.petitioned.remove(&service_key);
            }
        }
        Ok(())
    }

    pub fn delete_pending(&mut self, service_key: ServiceKey) {
        self.pending.remove(&service_key);
        self.petitioned.remove(&service_key);
    }

    /// Forget one service. Other services are untouched.
    pub fn reset_service(&mut self, service_key: ServiceKey) {
        self.current.remove(&service_key);
        self.deleted.remove(&service_key);
        self.pending.remove(&service_key);
        self.petitioned.remove(&service_key);
        self.timestamps.remove(&service_key);
    }

    pub fn get(&self, status: ContentStatus) -> &HashSet<ServiceKey> {
        match status {
            ContentStatus::Current => &self.current,
            ContentStatus::Deleted => &self.deleted,
            ContentStatus::Pending => &self.pending,
            ContentStatus::Petitioned => &self.petitioned,
        }
    }

    pub fn current(&self) -> &HashSet<ServiceKey> {
        &self.current
    }

    pub fn deleted(&self) -> &HashSet<ServiceKey> {
        &self.deleted
    }

    pub fn pending(&self) -> &HashSet<ServiceKey> {
        &self.pending
    }

    pub fn petitioned(&self) -> &HashSet<ServiceKey> {
        &self.petitioned
    }

    /// Remote part of a status set: everything but the local lifecycle keys.
    pub fn remote(&self, status: ContentStatus) -> HashSet<ServiceKey> {
        self.get(status)
            .iter()
            .filter(|key| !key.is_local_location())
            .copied()
            .collect()
    }

    pub fn current_remote(&self) -> HashSet<ServiceKey> {
        self.remote(ContentStatus::Current)
    }

    pub fn is_current(&self, service_key: &ServiceKey) -> bool {
        self.current.contains(service_key)
    }

    pub fn inbox(&self) -> bool {
        self.inbox
    }

    pub fn urls(&self) -> &BTreeSet<String> {
        &self.urls
    }

    pub fn filename(&self, service_key: &ServiceKey) -> Option<&str> {
        self.filenames.get(service_key).map(String::as_str)
    }

    pub fn timestamp(&self, service_key: &ServiceKey) -> Option<i64> {
        self.timestamps.get(service_key).copied()
    }

    pub fn is_downloading(&self) -> bool {
        self.pending.contains(&ServiceKey::COMBINED_LOCAL_FILE)
    }

    pub fn is_local(&self) -> bool {
        self.current.contains(&ServiceKey::COMBINED_LOCAL_FILE)
    }

    pub fn is_remote(&self) -> bool {
        !self.is_local()
    }

    pub fn is_trashed(&self) -> bool {
        self.current.contains(&ServiceKey::TRASH)
    }

    pub fn should_have_thumbnail(&self) -> bool {
        !self.current.is_empty()
    }

    /// Remote file services by name, `(+)` for pending uploads and `(-)` for
    /// petitioned removals.
    pub fn remote_location_strings(&self, services: &dyn ServiceDirectory) -> Vec<String> {
        let mut remote =
            services.services_of_types(&[ServiceType::FileRepository, ServiceType::Ipfs]);
        remote.sort_by(|a, b| a.name.cmp(&b.name));

        remote
            .into_iter()
            .filter_map(|service| {
                if self.pending.contains(&service.key) {
                    Some(format!("{} (+)", service.name))
                } else if self.current.contains(&service.key) {
                    if self.petitioned.contains(&service.key) {
                        Some(format!("{} (-)", service.name))
                    } else {
                        Some(service.name)
                    }
                } else {
                    None
                }
            })
            .collect()
    }
}
