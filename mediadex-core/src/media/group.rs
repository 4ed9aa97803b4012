use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mediadex_model::{ContentUpdate, FileHash, NodeId, ServiceAction, ServiceKey, ServiceUpdate};
use tracing::{debug, trace, warn};

use super::collect::{CollectBy, CollectKey};
use super::collection::MediaCollection;
use super::filter::{HashFilter, ResultFilter};
use super::node::{MediaNode, MediaSingleton};
use crate::context::IndexContext;
use crate::error::Result;
use crate::index::SortedIndex;
use crate::record::SharedRecord;
use crate::sorting::{ChainedSort, NodeSortKey, SortSpec};
use crate::visibility::deletion_hides_from_view;

/// An ordered list of singletons and collections scoped to one file service.
///
/// Keeps three things in step with the ordered nodes: the set of every hash
/// at or below this level, which top-level node owns each hash, and which
/// node currently holds each grouping key.
#[derive(Debug)]
pub struct MediaGroup {
    ctx: Arc<IndexContext>,
    file_service_key: ServiceKey,
    index: SortedIndex<MediaNode, NodeSortKey>,
    hashes: HashSet<FileHash>,
    owners: HashMap<FileHash, NodeId>,
    collect_by: CollectBy,
    collect_singletons: HashMap<CollectKey, NodeId>,
    collect_collections: HashMap<CollectKey, NodeId>,
    sort_spec: SortSpec,
}

impl MediaGroup {
    pub fn new(ctx: Arc<IndexContext>, file_service_key: ServiceKey) -> Self {
        let sort_spec = ctx.options().default_sort.clone();
        let mut group = Self {
            ctx,
            file_service_key,
            index: SortedIndex::default(),
            hashes: HashSet::new(),
            owners: HashMap::new(),
            collect_by: CollectBy::default(),
            collect_singletons: HashMap::new(),
            collect_collections: HashMap::new(),
            sort_spec,
        };
        // Arms the index so later inserts land in sorted position.
        group.sort(None);
        group
    }

    /// Ungrouped and unsorted, in the order given.
    pub fn from_records(
        ctx: Arc<IndexContext>,
        file_service_key: ServiceKey,
        records: impl IntoIterator<Item = SharedRecord>,
    ) -> Self {
        let mut group = Self::new(ctx, file_service_key);
        group.add_records(records, true);
        group
    }

    pub fn ctx(&self) -> &Arc<IndexContext> {
        &self.ctx
    }

    pub fn file_service_key(&self) -> ServiceKey {
        self.file_service_key
    }

    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort_spec
    }

    pub fn collect_by(&self) -> &CollectBy {
        &self.collect_by
    }

    /// Top-level nodes in display order.
    pub fn nodes(&self) -> &[MediaNode] {
        self.index.as_slice()
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of files at any depth.
    pub fn num_files(&self) -> usize {
        self.hashes.len()
    }

    pub fn hashes(&self) -> &HashSet<FileHash> {
        &self.hashes
    }

    pub fn node(&self, id: &NodeId) -> Option<&MediaNode> {
        self.index.get_by_id(id)
    }

    /// Top-level node holding `hash`.
    pub fn node_for_hash(&self, hash: &FileHash) -> Option<&MediaNode> {
        self.owners.get(hash).and_then(|id| self.index.get_by_id(id))
    }

    pub(crate) fn first_record(&self) -> Option<SharedRecord> {
        self.index.first().and_then(MediaNode::display_record)
    }

    /// Wrap records in fresh singletons and add them.
    pub fn add_records(
        &mut self,
        records: impl IntoIterator<Item = SharedRecord>,
        append: bool,
    ) -> Vec<NodeId> {
        let singletons = records.into_iter().map(MediaSingleton::new).collect();
        self.add_media(singletons, append)
    }

    /// Add singletons whose hashes are not present yet.
    ///
    /// `append` puts them at the end, ungrouped and unsorted. Otherwise they
    /// are grouped by the current criterion, merged into existing singletons
    /// or collections with the same key, and inserted at their sorted
    /// position. Returns the ids of the nodes that were added or changed.
    pub fn add_media(&mut self, singletons: Vec<MediaSingleton>, append: bool) -> Vec<NodeId> {
        let fresh = self.unseen(singletons);
        if fresh.is_empty() {
            return Vec::new();
        }
        trace!(count = fresh.len(), append, "adding media");

        if append {
            let ids = fresh.iter().map(MediaSingleton::id).collect();
            for singleton in &fresh {
                let hash = singleton.hash();
                self.hashes.insert(hash);
                self.owners.insert(hash, singleton.id());
            }
            self.index.append_items(fresh.into_iter().map(MediaNode::from));
            return ids;
        }

        self.place_media(fresh, true)
    }

    /// Group like `add_media(.., false)` but leave new nodes at the end and
    /// existing collections unsorted. Call [`sort`](Self::sort) once the
    /// whole batch is in.
    pub fn add_records_unsorted(
        &mut self,
        records: impl IntoIterator<Item = SharedRecord>,
    ) -> Vec<NodeId> {
        let fresh = self.unseen(records.into_iter().map(MediaSingleton::new).collect());
        if fresh.is_empty() {
            return Vec::new();
        }
        trace!(count = fresh.len(), "adding media, sort deferred");
        self.place_media(fresh, false)
    }

    fn unseen(&self, singletons: Vec<MediaSingleton>) -> Vec<MediaSingleton> {
        let mut seen = HashSet::new();
        singletons
            .into_iter()
            .filter(|singleton| {
                let hash = singleton.hash();
                !self.hashes.contains(&hash) && seen.insert(hash)
            })
            .collect()
    }

    fn place_media(&mut self, fresh: Vec<MediaSingleton>, sorted: bool) -> Vec<NodeId> {
        if self.collect_by.is_empty() {
            let ids = fresh.iter().map(MediaSingleton::id).collect();
            self.push_nodes(fresh.into_iter().map(MediaNode::from).collect(), sorted);
            return ids;
        }

        let mut touched = Vec::new();
        let mut new_nodes = Vec::new();
        for (key, mut medias) in self.keys_to_medias(fresh) {
            if let Some(existing) = self.collect_singletons.remove(&key) {
                match self.index.remove_items(&[existing]) {
                    Ok(removed) => {
                        medias.extend(removed.into_iter().flat_map(MediaNode::into_singletons))
                    }
                    Err(err) => warn!(%err, "grouping map pointed at a missing singleton"),
                }
                let collection = self.new_collection(medias);
                self.collect_collections.insert(key, collection.id());
                touched.push(collection.id());
                new_nodes.push(MediaNode::from(collection));
            } else if let Some(&existing) = self.collect_collections.get(&key) {
                let sort = self.sort_spec.clone();
                if let Some(collection) = self
                    .index
                    .get_mut_by_id(&existing)
                    .and_then(MediaNode::as_collection_mut)
                {
                    collection.add_media(medias);
                    if sorted {
                        collection.sort(Some(sort));
                    }
                    touched.push(existing);
                } else {
                    warn!(%existing, "grouping map pointed at a missing collection");
                    let collection = self.new_collection(medias);
                    self.collect_collections.insert(key, collection.id());
                    touched.push(collection.id());
                    new_nodes.push(MediaNode::from(collection));
                }
            } else if medias.len() == 1 {
                for singleton in medias {
                    self.collect_singletons.insert(key.clone(), singleton.id());
                    touched.push(singleton.id());
                    new_nodes.push(MediaNode::from(singleton));
                }
            } else {
                let collection = self.new_collection(medias);
                self.collect_collections.insert(key, collection.id());
                touched.push(collection.id());
                new_nodes.push(MediaNode::from(collection));
            }
        }

        self.push_nodes(new_nodes, sorted);
        touched
    }

    fn push_nodes(&mut self, nodes: Vec<MediaNode>, sorted: bool) {
        if sorted {
            self.index.insert_items(nodes);
        } else {
            self.index.append_items(nodes);
        }
        self.recalc_hashes();
    }

    /// Rebuild grouping from scratch, optionally with a new criterion.
    /// Existing singletons keep their identities.
    pub fn collect(&mut self, collect_by: Option<CollectBy>) {
        if let Some(collect_by) = collect_by {
            self.collect_by = collect_by;
        }

        let singletons: Vec<MediaSingleton> = self
            .index
            .take_items()
            .into_iter()
            .flat_map(MediaNode::into_singletons)
            .collect();
        self.collect_singletons.clear();
        self.collect_collections.clear();

        let nodes: Vec<MediaNode> = if self.collect_by.is_empty() {
            singletons.into_iter().map(MediaNode::from).collect()
        } else {
            let mut nodes = Vec::new();
            for (key, mut medias) in self.keys_to_medias(singletons) {
                if medias.len() == 1
                    && let Some(singleton) = medias.pop()
                {
                    self.collect_singletons.insert(key, singleton.id());
                    nodes.push(MediaNode::from(singleton));
                } else {
                    let collection = self.new_collection(medias);
                    self.collect_collections.insert(key, collection.id());
                    nodes.push(MediaNode::from(collection));
                }
            }
            nodes
        };

        debug!(
            nodes = nodes.len(),
            collections = self.collect_collections.len(),
            "regrouped media"
        );
        self.index.append_items(nodes);
        self.recalc_hashes();
        self.sort(None);
    }

    /// Sort with `sort`, or re-apply the current sort. Collections sort
    /// their members the same way. The configured fallback sort orders ties.
    pub fn sort(&mut self, sort: Option<SortSpec>) {
        for node in self.index.iter_mut() {
            if let Some(collection) = node.as_collection_mut() {
                collection.sort(sort.clone());
            }
        }
        if let Some(sort) = sort {
            self.sort_spec = sort;
        }

        ChainedSort::new(self.sort_spec.clone())
            .then_by(self.ctx.options().fallback_sort.clone())
            .apply(&mut self.index, &self.ctx, self.file_service_key);
    }

    /// Refresh collections holding the affected records, then drop files
    /// whose deletion hides them from this view.
    ///
    /// Records themselves are updated by their owner before this is called.
    pub fn process_content_update(
        &mut self,
        service_key: ServiceKey,
        update: &ContentUpdate,
    ) -> Result<()> {
        let hashes: HashSet<FileHash> = update.hashes().iter().copied().collect();
        if hashes.is_disjoint(&self.hashes) {
            return Ok(());
        }

        for id in self.collection_owners(&hashes) {
            if let Some(collection) = self
                .index
                .get_mut_by_id(&id)
                .and_then(MediaNode::as_collection_mut)
            {
                collection.process_content_update(service_key, update)?;
            }
        }

        if update.is_file_deletion()
            && deletion_hides_from_view(&self.ctx, service_key, self.file_service_key)
        {
            self.remove_media_by_hashes(&hashes);
        }
        Ok(())
    }

    /// Updates are applied in the order given.
    pub fn process_content_updates(
        &mut self,
        updates: &[(ServiceKey, Vec<ContentUpdate>)],
    ) -> Result<()> {
        for (service_key, updates) in updates {
            for update in updates {
                self.process_content_update(*service_key, update)?;
            }
        }
        Ok(())
    }

    pub fn process_service_updates(&mut self, updates: &[ServiceUpdate]) {
        for update in updates {
            match update.action {
                ServiceAction::DeletePending => self.delete_pending(update.service_key),
                ServiceAction::Reset => self.reset_service(update.service_key),
            }
        }
    }

    pub fn delete_pending(&mut self, service_key: ServiceKey) {
        for node in self.index.iter_mut() {
            if let Some(collection) = node.as_collection_mut() {
                collection.delete_pending(service_key);
            }
        }
    }

    /// Resetting the service this view is scoped to empties the view.
    pub fn reset_service(&mut self, service_key: ServiceKey) {
        if service_key == self.file_service_key {
            debug!(?service_key, "view service reset; dropping all media");
            self.index.take_items();
            self.collect_singletons.clear();
            self.collect_collections.clear();
            self.recalc_hashes();
            return;
        }
        for node in self.index.iter_mut() {
            if let Some(collection) = node.as_collection_mut() {
                collection.reset_service(service_key);
            }
        }
    }

    pub(crate) fn notify_siblings_changed(&mut self) {
        for node in self.index.iter_mut() {
            if let Some(collection) = node.as_collection_mut() {
                collection.notify_siblings_changed();
            }
        }
    }

    /// Remove files at any depth. Collections left empty are removed too.
    pub fn remove_media_by_hashes(&mut self, hashes: &HashSet<FileHash>) {
        if hashes.is_disjoint(&self.hashes) {
            return;
        }

        let mut doomed: Vec<NodeId> = hashes
            .iter()
            .filter_map(|hash| self.owners.get(hash))
            .filter(|id| {
                self.index
                    .get_by_id(id)
                    .is_some_and(|node| !node.is_collection())
            })
            .copied()
            .collect();

        for id in self.collection_owners(hashes) {
            if let Some(collection) = self
                .index
                .get_mut_by_id(&id)
                .and_then(MediaNode::as_collection_mut)
            {
                collection.remove_media_by_hashes(hashes);
                if collection.members().is_empty() {
                    doomed.push(id);
                }
            }
        }

        self.remove_directly(&doomed);
    }

    fn remove_directly(&mut self, ids: &[NodeId]) {
        if let Err(err) = self.index.remove_items(ids) {
            warn!(%err, "tried to remove a node that is not in the view");
        }
        let doomed: HashSet<&NodeId> = ids.iter().collect();
        self.collect_singletons.retain(|_, id| !doomed.contains(id));
        self.collect_collections.retain(|_, id| !doomed.contains(id));
        self.recalc_hashes();
    }

    fn collection_owners(&self, hashes: &HashSet<FileHash>) -> Vec<NodeId> {
        let mut owners: Vec<NodeId> = hashes
            .iter()
            .filter_map(|hash| self.owners.get(hash))
            .filter(|id| {
                self.index
                    .get_by_id(id)
                    .is_some_and(MediaNode::is_collection)
            })
            .copied()
            .collect();
        owners.sort();
        owners.dedup();
        owners
    }

    fn recalc_hashes(&mut self) {
        self.hashes.clear();
        self.owners.clear();
        for node in self.index.iter() {
            let id = node.id();
            for hash in node.hashes() {
                self.hashes.insert(hash);
                self.owners.insert(hash, id);
            }
        }
    }

    fn new_collection(&self, singletons: Vec<MediaSingleton>) -> MediaCollection {
        MediaCollection::new(
            Arc::clone(&self.ctx),
            self.file_service_key,
            singletons,
            self.sort_spec.clone(),
        )
    }

    /// Bucket singletons by grouping key, keys in order of first appearance.
    fn keys_to_medias(
        &self,
        singletons: Vec<MediaSingleton>,
    ) -> Vec<(CollectKey, Vec<MediaSingleton>)> {
        let mut positions: HashMap<CollectKey, usize> = HashMap::new();
        let mut buckets: Vec<(CollectKey, Vec<MediaSingleton>)> = Vec::new();
        for singleton in singletons {
            let key = singleton
                .with_record(|record| self.collect_by.key_for(record, self.ctx.siblings()));
            match positions.get(&key) {
                Some(&position) => buckets[position].1.push(singleton),
                None => {
                    positions.insert(key.clone(), buckets.len());
                    buckets.push((key, vec![singleton]));
                }
            }
        }
        buckets
    }

    /// Lazily walk the records that pass `filter`, collections expanded in
    /// place.
    pub fn generate_media_results<'a>(&'a self, filter: &'a ResultFilter) -> MediaResults<'a> {
        MediaResults {
            ctx: &self.ctx,
            filter,
            stack: vec![(self.index.iter(), filter.selected.is_none())],
        }
    }

    pub fn first_media(&self) -> Option<&MediaNode> {
        self.index.first()
    }

    pub fn last_media(&self) -> Option<&MediaNode> {
        self.index.last()
    }

    /// The node after `id`, wrapping to the first.
    pub fn next_media(&self, id: &NodeId) -> Option<&MediaNode> {
        let index = self.index.index_of(id).ok()?;
        self.index.get(index + 1).or_else(|| self.index.first())
    }

    /// The node before `id`, wrapping to the last.
    pub fn previous_media(&self, id: &NodeId) -> Option<&MediaNode> {
        let index = self.index.index_of(id).ok()?;
        match index.checked_sub(1) {
            Some(previous) => self.index.get(previous),
            None => self.index.last(),
        }
    }

    pub fn media_index(&self, id: &NodeId) -> Result<usize> {
        self.index.index_of(id)
    }

    /// Hashes passing `filter`, at any depth.
    pub fn get_hashes(&self, filter: &HashFilter) -> HashSet<FileHash> {
        if filter.is_unfiltered() {
            return self.hashes.clone();
        }
        self.get_hashes_ordered(filter).into_iter().collect()
    }

    /// Hashes passing `filter` in display order.
    pub fn get_hashes_ordered(&self, filter: &HashFilter) -> Vec<FileHash> {
        self.flat_media()
            .into_iter()
            .filter_map(|singleton| {
                singleton.with_record(|record| filter.matches(record).then(|| record.hash()))
            })
            .collect()
    }

    pub fn has_any_of_these_hashes(&self, hashes: &HashSet<FileHash>) -> bool {
        !hashes.is_disjoint(&self.hashes)
    }

    /// Whether `id` is a node at any depth.
    pub fn has_media(&self, id: &NodeId) -> bool {
        self.index.contains(id)
            || self.index.iter().any(|node| {
                node.as_collection()
                    .is_some_and(|collection| collection.members().has_media(id))
            })
    }

    /// Every singleton at any depth, in display order.
    pub fn flat_media(&self) -> Vec<&MediaSingleton> {
        self.index.iter().flat_map(MediaNode::flat_singletons).collect()
    }

    pub fn num_inbox(&self) -> usize {
        self.index.iter().map(MediaNode::num_inbox).sum()
    }

    pub(crate) fn into_singletons(mut self) -> Vec<MediaSingleton> {
        self.index
            .take_items()
            .into_iter()
            .flat_map(MediaNode::into_singletons)
            .collect()
    }
}

/// Records yielded by [`MediaGroup::generate_media_results`].
#[derive(Debug, Clone)]
pub struct MediaResults<'a> {
    ctx: &'a IndexContext,
    filter: &'a ResultFilter,
    /// Open levels; the flag says a selected ancestor already admitted them.
    stack: Vec<(std::slice::Iter<'a, MediaNode>, bool)>,
}

impl MediaResults<'_> {
    fn admits_record(&self, singleton: &MediaSingleton) -> bool {
        singleton.with_record(|record| {
            if let Some(discriminant) = &self.filter.discriminant
                && !discriminant.matches(record)
            {
                return false;
            }
            if let Some(service_key) = &self.filter.unrated
                && record.ratings().rating(service_key).is_some()
            {
                return false;
            }
            if self.filter.for_media_viewer
                && !self
                    .ctx
                    .options()
                    .media_show_action(record.mime())
                    .is_viewable()
            {
                return false;
            }
            true
        })
    }
}

impl Iterator for MediaResults<'_> {
    type Item = SharedRecord;

    fn next(&mut self) -> Option<SharedRecord> {
        loop {
            let (nodes, admitted) = self.stack.last_mut()?;
            let admitted = *admitted;
            let Some(node) = nodes.next() else {
                self.stack.pop();
                continue;
            };

            if let Some(service_key) = &self.filter.has_location
                && !node.with_locations(|locations| locations.is_current(service_key))
            {
                continue;
            }
            let selected = admitted
                || self
                    .filter
                    .selected
                    .as_ref()
                    .is_some_and(|ids| ids.contains(&node.id()));
            if !selected {
                continue;
            }

            match node {
                MediaNode::Collection(collection) => {
                    self.stack.push((collection.members().nodes().iter(), true));
                }
                MediaNode::Singleton(singleton) => {
                    if self.admits_record(singleton) {
                        return Some(singleton.record().clone());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::LocationState;
    use crate::record::MediaRecord;
    use crate::tags::{StatusesToTags, TagState};
    use mediadex_model::{FileMetadata, Mime};

    fn series_record(seed: &str, series: &str) -> SharedRecord {
        let mut statuses = StatusesToTags::default();
        statuses.current.insert(format!("series:{series}"));
        MediaRecord::from_file(FileMetadata::new(FileHash::of_content(seed.as_bytes()), Mime::ImagePng))
            .with_tags(TagState::new(HashMap::from([(ServiceKey::LOCAL_TAG, statuses)])))
            .with_locations(LocationState::new(
                [ServiceKey::LOCAL_FILE, ServiceKey::COMBINED_LOCAL_FILE].into(),
                Default::default(),
                Default::default(),
                Default::default(),
            ))
            .into_shared()
    }

    #[test]
    fn stale_collection_entry_still_places_new_media() {
        let mut group = MediaGroup::new(IndexContext::standalone(), ServiceKey::LOCAL_FILE);
        group.collect(Some(CollectBy::namespaces(["series"])));
        group.add_records([series_record("a1", "a"), series_record("a2", "a")], false);
        let stale = group.node_for_hash(&FileHash::of_content(b"a1")).unwrap().id();

        // Drop the collection behind the grouping map's back.
        group.index.remove_items(&[stale]).unwrap();
        group.recalc_hashes();

        let touched = group.add_records([series_record("a3", "a")], false);
        assert_eq!(touched.len(), 1);
        assert_ne!(touched[0], stale);
        assert!(group.hashes().contains(&FileHash::of_content(b"a3")));
        assert_eq!(group.collect_collections.values().next(), Some(&touched[0]));
    }
}
