use std::collections::HashMap;
use std::sync::Arc;

use mediadex_model::{ContentUpdate, FileHash, NodeId, ServiceKey, ServiceUpdate};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::group::MediaGroup;
use crate::context::IndexContext;
use crate::error::Result;
use crate::record::{MediaRecord, SharedRecord};

/// The records behind one search result plus the group displaying them.
///
/// Updates reach each record exactly once here, then the group is told so
/// it can refresh collections and drop files that left its scope.
#[derive(Debug)]
pub struct MediaView {
    ctx: Arc<IndexContext>,
    records: HashMap<FileHash, SharedRecord>,
    arrival: Vec<FileHash>,
    group: MediaGroup,
}

impl MediaView {
    pub fn new(ctx: Arc<IndexContext>, file_service_key: ServiceKey) -> Self {
        let group = MediaGroup::new(Arc::clone(&ctx), file_service_key);
        Self {
            ctx,
            records: HashMap::new(),
            arrival: Vec::new(),
            group,
        }
    }

    pub fn with_records(
        ctx: Arc<IndexContext>,
        file_service_key: ServiceKey,
        records: impl IntoIterator<Item = MediaRecord>,
    ) -> Self {
        let mut view = Self::new(ctx, file_service_key);
        view.add_media_results(records, true);
        view
    }

    pub fn group(&self) -> &MediaGroup {
        &self.group
    }

    pub fn group_mut(&mut self) -> &mut MediaGroup {
        &mut self.group
    }

    pub fn record(&self, hash: &FileHash) -> Option<&SharedRecord> {
        self.records.get(hash)
    }

    /// Records in the order they arrived.
    pub fn records(&self) -> impl Iterator<Item = &SharedRecord> {
        self.arrival.iter().filter_map(|hash| self.records.get(hash))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add records not seen before. Returns the ids of touched nodes.
    pub fn add_media_results(
        &mut self,
        records: impl IntoIterator<Item = MediaRecord>,
        append: bool,
    ) -> Vec<NodeId> {
        let fresh = self.remember(records);
        self.group.add_records(fresh, append)
    }

    fn remember(&mut self, records: impl IntoIterator<Item = MediaRecord>) -> Vec<SharedRecord> {
        let mut fresh = Vec::new();
        for record in records {
            let hash = record.hash();
            if self.records.contains_key(&hash) {
                continue;
            }
            let shared = record.into_shared();
            self.records.insert(hash, shared.clone());
            self.arrival.push(hash);
            fresh.push(shared);
        }
        trace!(added = fresh.len(), "new media results");
        fresh
    }

    /// Apply a finished batch a chunk at a time, yielding between chunks.
    /// Chunks are grouped as they land and the group is sorted once at the
    /// end. Stops early once `token` is cancelled; returns how many records
    /// were handed to the view.
    pub async fn apply_in_chunks(
        &mut self,
        records: Vec<MediaRecord>,
        chunk_size: usize,
        token: &CancellationToken,
    ) -> usize {
        let chunk_size = chunk_size.max(1);
        let mut applied = 0;
        let mut records = records.into_iter().peekable();
        while records.peek().is_some() {
            if token.is_cancelled() {
                debug!(applied, "stopped applying results; query cancelled");
                break;
            }
            let chunk: Vec<MediaRecord> = records.by_ref().take(chunk_size).collect();
            applied += chunk.len();
            let fresh = self.remember(chunk);
            self.group.add_records_unsorted(fresh);
            tokio::task::yield_now().await;
        }
        if applied > 0 {
            self.group.sort(None);
        }
        applied
    }

    /// Apply updates in order, stopping at the first invalid one. Whatever
    /// was applied before the failure stays applied.
    pub fn process_content_updates(
        &mut self,
        updates: &[(ServiceKey, Vec<ContentUpdate>)],
    ) -> Result<()> {
        let result = self.apply_content_updates(updates);
        self.forget_removed();
        result
    }

    fn apply_content_updates(&mut self, updates: &[(ServiceKey, Vec<ContentUpdate>)]) -> Result<()> {
        for (service_key, updates) in updates {
            for update in updates {
                for hash in update.hashes() {
                    if let Some(record) = self.records.get(hash) {
                        record.borrow_mut().process_content_update(
                            *service_key,
                            update,
                            self.ctx.services(),
                        )?;
                    }
                }
                self.group.process_content_update(*service_key, update)?;
            }
        }
        Ok(())
    }

    pub fn process_service_updates(&mut self, updates: &[ServiceUpdate]) {
        for update in updates {
            for record in self.records.values() {
                record.borrow_mut().process_service_update(update);
            }
        }
        self.group.process_service_updates(updates);
        self.forget_removed();
    }

    pub fn notify_siblings_changed(&mut self) {
        for record in self.records.values() {
            record.borrow_mut().notify_siblings_changed();
        }
        self.group.notify_siblings_changed();
    }

    fn forget_removed(&mut self) {
        let shown = self.group.hashes();
        if shown.len() == self.records.len() {
            return;
        }
        self.records.retain(|hash, _| shown.contains(hash));
        self.arrival.retain(|hash| shown.contains(hash));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::LocationState;
    use crate::siblings::NoSiblings;
    use mediadex_model::{ContentAction, FileMetadata, Mime};

    fn local_record(seed: &str) -> MediaRecord {
        MediaRecord::from_file(FileMetadata::new(FileHash::of_content(seed.as_bytes()), Mime::ImagePng))
            .with_locations(LocationState::new(
                [ServiceKey::LOCAL_FILE, ServiceKey::COMBINED_LOCAL_FILE].into(),
                Default::default(),
                Default::default(),
                Default::default(),
            ))
    }

    #[test]
    fn duplicate_results_are_skipped() {
        let mut view = MediaView::with_records(
            IndexContext::standalone(),
            ServiceKey::LOCAL_FILE,
            [local_record("a"), local_record("b")],
        );
        let added = view.add_media_results([local_record("a"), local_record("c")], true);
        assert_eq!(added.len(), 1);
        assert_eq!(view.len(), 3);
        assert_eq!(view.group().num_files(), 3);
    }

    #[test]
    fn updates_reach_each_record_once() {
        let mut view = MediaView::with_records(
            IndexContext::standalone(),
            ServiceKey::LOCAL_FILE,
            [local_record("a")],
        );
        let hash = FileHash::of_content(b"a");
        let update = ContentUpdate::mapping(ContentAction::Add, "series:x", [hash]).unwrap();
        view.process_content_updates(&[(ServiceKey::LOCAL_TAG, vec![update])])
            .unwrap();

        let record = view.record(&hash).unwrap().borrow();
        assert_eq!(record.tags().current(&NoSiblings).len(), 1);
    }

    #[test]
    fn purged_files_leave_the_view() {
        let mut view = MediaView::with_records(
            IndexContext::standalone(),
            ServiceKey::LOCAL_FILE,
            [local_record("a"), local_record("b")],
        );
        let hash = FileHash::of_content(b"a");
        let purge = ContentUpdate::files(ContentAction::Delete, [hash]).unwrap();
        view.process_content_updates(&[(ServiceKey::TRASH, vec![purge])])
            .unwrap();
        assert_eq!(view.len(), 1);
        assert!(view.record(&hash).is_none());
        assert!(!view.group().hashes().contains(&hash));
    }

    #[tokio::test]
    async fn chunked_apply_stops_on_cancel() {
        let mut view = MediaView::new(IndexContext::standalone(), ServiceKey::LOCAL_FILE);
        let token = CancellationToken::new();
        let batch: Vec<_> = (0..10).map(|i| local_record(&format!("r{i}"))).collect();
        assert_eq!(view.apply_in_chunks(batch, 4, &token).await, 10);
        assert_eq!(view.group().num_files(), 10);

        token.cancel();
        let more: Vec<_> = (10..20).map(|i| local_record(&format!("r{i}"))).collect();
        assert_eq!(view.apply_in_chunks(more, 4, &token).await, 0);
        assert_eq!(view.group().num_files(), 10);
    }
}
