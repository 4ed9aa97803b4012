//! Per-service tag state and the sibling-collapsed combined view.

mod text;

pub use text::{SortableTag, combine_tag, sort_numeric_tags, split_tag};

use std::sync::OnceLock;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use mediadex_model::{
    ContentAction, ContentPayload, ContentStatus, ContentType, ContentUpdate,
    ServiceKey,
};

use crate::error::{IndexError, Result};
use crate::siblings::SiblingResolver;

static NO_TAGS: BTreeSet<String> = BTreeSet::new();

/// The four status sets one service holds for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusesToTags {
    pub current: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
    pub pending: BTreeSet<String>,
    pub petitioned: BTreeSet<String>,
}

impl StatusesToTags {
    pub fn get(&self, status: ContentStatus) -> &BTreeSet<String> {
        match status {
            ContentStatus::Current => &self.current,
            ContentStatus::Deleted => &self.deleted,
            ContentStatus::Pending => &self.pending,
            ContentStatus::Petitioned => &self.petitioned,
        }
    }

    pub fn get_mut(&mut self, status: ContentStatus) -> &mut BTreeSet<String> {
        match status {
            ContentStatus::Current => &mut self.current,
            ContentStatus::Deleted => &mut self.deleted,
            ContentStatus::Pending => &mut self.pending,
            ContentStatus::Petitioned => &mut self.petitioned,
        }
    }

    pub fn is_empty(&self) -> bool {
        ContentStatus::ALL.iter().all(|s| self.get(*s).is_empty())
    }

    /// Current and pending tags together.
    pub fn current_and_pending(&self) -> impl Iterator<Item = &String> {
        self.current.union(&self.pending)
    }

    /// Rewrite every tag through `f`, keeping statuses.
    pub fn map_tags(&self, mut f: impl FnMut(&str) -> String) -> StatusesToTags {
        let mut out = StatusesToTags::default();
        for status in ContentStatus::ALL {
            out.get_mut(status)
                .extend(self.get(status).iter().map(|tag| f(tag)));
        }
        out
    }

    fn absorb(&mut self, other: &StatusesToTags) {
        for status in ContentStatus::ALL {
            self.get_mut(status).extend(other.get(status).iter().cloned());
        }
    }
}

/// Tag state of one record (or the merged state of a collection).
///
/// The combined view and the namespace breakdown derived from it are memoised
/// and only dropped by mutators; nothing is recomputed until the next read.
#[derive(Debug, Clone, Default)]
pub struct TagState {
    services: HashMap<ServiceKey, StatusesToTags>,
    combined: OnceLock<StatusesToTags>,
    namespaces: OnceLock<BTreeMap<String, BTreeSet<String>>>,
}

impl PartialEq for TagState {
    fn eq(&self, other: &Self) -> bool {
        self.services == other.services
    }
}

impl TagState {
    pub fn new(services: HashMap<ServiceKey, StatusesToTags>) -> Self {
        Self {
            services,
            ..Self::default()
        }
    }

    /// Collection-level merge: per service, the union of every child's
    /// current and pending tags. Deleted and petitioned tags are dropped.
    pub fn merge<'a>(states: impl IntoIterator<Item = &'a TagState>) -> TagState {
        let mut services: HashMap<ServiceKey, StatusesToTags> = HashMap::new();
        for state in states {
            for (service_key, statuses) in &state.services {
                let merged = services.entry(*service_key).or_default();
                merged.current.extend(statuses.current.iter().cloned());
                merged.pending.extend(statuses.pending.iter().cloned());
            }
        }
        TagState::new(services)
    }

    fn invalidate(&mut self) {
        self.combined.take();
        self.namespaces.take();
    }

    /// Siblings changed; the combined view must be rebuilt on next read.
    pub fn notify_siblings_changed(&mut self) {
        self.invalidate();
    }

    pub fn process_content_update(
        &mut self,
        service_key: ServiceKey,
        update: &ContentUpdate,
    ) -> Result<()> {
        if service_key == ServiceKey::COMBINED_TAG {
            return Err(IndexError::invalid_update(
                update,
                "the combined tag service cannot be updated directly",
            ));
        }

        let tag = match (&update.data_type, &update.payload) {
            (ContentType::Tags, ContentPayload::Mappings { tag, .. }) => tag,
            _ => {
                return Err(IndexError::invalid_update(
                    update,
                    "tag state only accepts mapping updates",
                ));
            }
        };

        let statuses = self.services.entry(service_key).or_default();
        match update.action {
            ContentAction::Add => {
                statuses.current.insert(tag.clone());
                statuses.deleted.remove(tag);
                statuses.pending.remove(tag);
            }
            ContentAction::Delete => {
                statuses.deleted.insert(tag.clone());
                statuses.current.remove(tag);
                statuses.petitioned.remove(tag);
            }
            ContentAction::Pend => {
                if !statuses.current.contains(tag) {
                    statuses.pending.insert(tag.clone());
                }
            }
            ContentAction::RescindPend => {
                statuses.pending.remove(tag);
            }
            ContentAction::Petition => {
                if statuses.current.contains(tag) {
                    statuses.petitioned.insert(tag.clone());
                }
            }
            ContentAction::RescindPetition => {
                statuses.petitioned.remove(tag);
            }
            ContentAction::Undelete
            | ContentAction::Archive
            | ContentAction::Inbox => {
                return Err(IndexError::invalid_update(
                    update,
                    "action does not apply to tags",
                ));
            }
        }

        self.invalidate();
        Ok(())
    }

    /// Drop pending and petitioned tags for one service.
    pub fn delete_pending(&mut self, service_key: ServiceKey) {
        let Some(statuses) = self.services.get_mut(&service_key) else {
            return;
        };
        if statuses.pending.is_empty() && statuses.petitioned.is_empty() {
            return;
        }
        statuses.pending.clear();
        statuses.petitioned.clear();
        self.invalidate();
    }

    pub fn reset_service(&mut self, service_key: ServiceKey) {
        if self.services.remove(&service_key).is_some() {
            self.invalidate();
        }
    }

    /// Real services with any recorded state.
    pub fn service_keys(&self) -> impl Iterator<Item = &ServiceKey> {
        self.services.keys()
    }

    /// Union over every real service after sibling collapsing.
    pub fn combined(&self, siblings: &dyn SiblingResolver) -> &StatusesToTags {
        self.combined.get_or_init(|| {
            let mut combined = StatusesToTags::default();
            for (service_key, statuses) in &self.services {
                let collapsed =
                    siblings.collapse_statuses_to_tags(*service_key, statuses);
                combined.absorb(&collapsed);
            }
            combined
        })
    }

    /// Status sets for a real service, or the combined view for
    /// [`ServiceKey::COMBINED_TAG`].
    pub fn statuses_to_tags(
        &self,
        service_key: ServiceKey,
        siblings: &dyn SiblingResolver,
    ) -> Option<&StatusesToTags> {
        if service_key == ServiceKey::COMBINED_TAG {
            Some(self.combined(siblings))
        } else {
            self.services.get(&service_key)
        }
    }

    pub fn tags(
        &self,
        service_key: ServiceKey,
        status: ContentStatus,
        siblings: &dyn SiblingResolver,
    ) -> &BTreeSet<String> {
        self.statuses_to_tags(service_key, siblings)
            .map(|statuses| statuses.get(status))
            .unwrap_or(&NO_TAGS)
    }

    pub fn current(&self, siblings: &dyn SiblingResolver) -> &BTreeSet<String> {
        &self.combined(siblings).current
    }

    pub fn pending(&self, siblings: &dyn SiblingResolver) -> &BTreeSet<String> {
        &self.combined(siblings).pending
    }

    pub fn num_tags(
        &self,
        service_key: ServiceKey,
        include_current: bool,
        include_pending: bool,
        siblings: &dyn SiblingResolver,
    ) -> usize {
        let Some(statuses) = self.statuses_to_tags(service_key, siblings) else {
            return 0;
        };
        let mut count = 0;
        if include_current {
            count += statuses.current.len();
        }
        if include_pending {
            count += statuses.pending.len();
        }
        count
    }

    pub fn has_tag(&self, tag: &str, siblings: &dyn SiblingResolver) -> bool {
        let combined = self.combined(siblings);
        combined.current.contains(tag) || combined.pending.contains(tag)
    }

    fn namespace_cache(
        &self,
        siblings: &dyn SiblingResolver,
    ) -> &BTreeMap<String, BTreeSet<String>> {
        self.namespaces.get_or_init(|| {
            let mut cache: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            for tag in self.combined(siblings).current_and_pending() {
                let (namespace, subtag) = split_tag(tag);
                if !namespace.is_empty() {
                    cache
                        .entry(namespace.to_string())
                        .or_default()
                        .insert(subtag.to_string());
                }
            }
            cache
        })
    }

    /// Subtags per requested namespace. Absent namespaces map to empty sets.
    pub fn combined_namespaces(
        &self,
        namespaces: &[&str],
        siblings: &dyn SiblingResolver,
    ) -> BTreeMap<String, BTreeSet<String>> {
        let cache = self.namespace_cache(siblings);
        namespaces
            .iter()
            .map(|namespace| {
                let subtags = cache.get(*namespace).cloned().unwrap_or_default();
                (namespace.to_string(), subtags)
            })
            .collect()
    }

    /// Full tags (namespace included) in the given namespaces.
    pub fn namespace_slice(
        &self,
        namespaces: &[String],
        siblings: &dyn SiblingResolver,
    ) -> BTreeSet<String> {
        self.combined(siblings)
            .current_and_pending()
            .filter(|tag| {
                namespaces
                    .iter()
                    .any(|namespace| tag.starts_with(&format!("{namespace}:")))
            })
            .cloned()
            .collect()
    }

    /// Per namespace, the sorted sortable subtags. Used as a sort key.
    pub fn comparable_namespace_slice(
        &self,
        namespaces: &[String],
        siblings: &dyn SiblingResolver,
    ) -> Vec<Vec<SortableTag>> {
        let cache = self.namespace_cache(siblings);
        namespaces
            .iter()
            .map(|namespace| {
                let mut subtags: Vec<SortableTag> = cache
                    .get(namespace)
                    .map(|subtags| subtags.iter().map(|s| SortableTag::new(s)).collect())
                    .unwrap_or_default();
                subtags.sort();
                subtags
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::siblings::{NoSiblings, StaticSiblings};
    use mediadex_model::FileHash;

    fn mapping(action: ContentAction, tag: &str) -> ContentUpdate {
        ContentUpdate::mapping(action, tag, [FileHash::of_content(b"r")]).unwrap()
    }

    fn repo() -> ServiceKey {
        ServiceKey::from_name("tag repo")
    }

    #[test]
    fn pend_then_add_promotes_to_current() {
        let mut state = TagState::default();
        state
            .process_content_update(repo(), &mapping(ContentAction::Pend, "blue"))
            .unwrap();
        assert!(state.tags(repo(), ContentStatus::Pending, &NoSiblings).contains("blue"));

        state
            .process_content_update(repo(), &mapping(ContentAction::Add, "blue"))
            .unwrap();
        let statuses = state.statuses_to_tags(repo(), &NoSiblings).unwrap();
        assert!(statuses.current.contains("blue"));
        assert!(statuses.pending.is_empty());

        let once = state.clone();
        state
            .process_content_update(repo(), &mapping(ContentAction::Add, "blue"))
            .unwrap();
        assert_eq!(state, once);
    }

    #[test]
    fn pend_and_petition_guards_are_silent() {
        let mut state = TagState::default();
        state
            .process_content_update(repo(), &mapping(ContentAction::Petition, "red"))
            .unwrap();
        assert!(state.tags(repo(), ContentStatus::Petitioned, &NoSiblings).is_empty());

        state
            .process_content_update(repo(), &mapping(ContentAction::Add, "red"))
            .unwrap();
        state
            .process_content_update(repo(), &mapping(ContentAction::Pend, "red"))
            .unwrap();
        assert!(state.tags(repo(), ContentStatus::Pending, &NoSiblings).is_empty());

        state
            .process_content_update(repo(), &mapping(ContentAction::Petition, "red"))
            .unwrap();
        state
            .process_content_update(repo(), &mapping(ContentAction::Delete, "red"))
            .unwrap();
        let statuses = state.statuses_to_tags(repo(), &NoSiblings).unwrap();
        assert!(statuses.deleted.contains("red"));
        assert!(statuses.current.is_empty());
        assert!(statuses.petitioned.is_empty());
    }

    #[test]
    fn rejects_non_mapping_updates() {
        let mut state = TagState::default();
        let update = ContentUpdate::files(ContentAction::Archive, [FileHash::of_content(b"r")])
            .unwrap();
        let err = state.process_content_update(repo(), &update).unwrap_err();
        assert!(matches!(err, IndexError::InvalidContentUpdate { .. }));

        let err = state
            .process_content_update(ServiceKey::COMBINED_TAG, &mapping(ContentAction::Add, "x"))
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidContentUpdate { .. }));
    }

    #[test]
    fn combined_view_collapses_siblings_and_is_invalidated() {
        let siblings = StaticSiblings::default().with_pair("colour:grey", "colour:gray");
        let mut state = TagState::default();
        state
            .process_content_update(ServiceKey::LOCAL_TAG, &mapping(ContentAction::Add, "colour:grey"))
            .unwrap();
        state
            .process_content_update(repo(), &mapping(ContentAction::Pend, "creator:someone"))
            .unwrap();

        assert!(state.has_tag("colour:gray", &siblings));
        assert!(!state.has_tag("colour:grey", &siblings));
        assert_eq!(
            state.num_tags(ServiceKey::COMBINED_TAG, true, true, &siblings),
            2
        );

        state
            .process_content_update(repo(), &mapping(ContentAction::RescindPend, "creator:someone"))
            .unwrap();
        assert_eq!(
            state.num_tags(ServiceKey::COMBINED_TAG, true, true, &siblings),
            1
        );
    }

    #[test]
    fn namespace_queries() {
        let mut state = TagState::default();
        for tag in ["page:10", "page:2", "series:foo", "plain"] {
            state
                .process_content_update(repo(), &mapping(ContentAction::Add, tag))
                .unwrap();
        }
        let slice = state.namespace_slice(&["page".to_string()], &NoSiblings);
        assert_eq!(slice.len(), 2);
        assert!(slice.contains("page:10"));

        let comparable =
            state.comparable_namespace_slice(&["page".to_string(), "volume".to_string()], &NoSiblings);
        let pages: Vec<&str> = comparable[0].iter().map(|t| t.as_str()).collect();
        assert_eq!(pages, vec!["2", "10"]);
        assert!(comparable[1].is_empty());

        let namespaces = state.combined_namespaces(&["series", "title"], &NoSiblings);
        assert!(namespaces["series"].contains("foo"));
        assert!(namespaces["title"].is_empty());
    }

    #[test]
    fn delete_pending_and_reset() {
        let mut state = TagState::default();
        state
            .process_content_update(repo(), &mapping(ContentAction::Pend, "a"))
            .unwrap();
        state
            .process_content_update(repo(), &mapping(ContentAction::Add, "b"))
            .unwrap();
        state.delete_pending(repo());
        assert!(state.pending(&NoSiblings).is_empty());
        assert!(state.current(&NoSiblings).contains("b"));

        state.reset_service(repo());
        assert!(state.current(&NoSiblings).is_empty());
        assert!(state.statuses_to_tags(repo(), &NoSiblings).is_none());
    }

    #[test]
    fn merge_keeps_only_current_and_pending() {
        let mut a = TagState::default();
        a.process_content_update(repo(), &mapping(ContentAction::Add, "shared"))
            .unwrap();
        a.process_content_update(repo(), &mapping(ContentAction::Delete, "gone"))
            .unwrap();
        let mut b = TagState::default();
        b.process_content_update(repo(), &mapping(ContentAction::Pend, "maybe"))
            .unwrap();
        b.process_content_update(repo(), &mapping(ContentAction::Add, "shared"))
            .unwrap();

        let merged = TagState::merge([&a, &b]);
        let statuses = merged.statuses_to_tags(repo(), &NoSiblings).unwrap();
        assert_eq!(statuses.current.len(), 1);
        assert!(statuses.pending.contains("maybe"));
        // Deleted status does not survive the merge.
        assert!(statuses.deleted.is_empty());
    }
}
