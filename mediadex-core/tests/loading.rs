mod support;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use mediadex_core::loader::{MediaSource, QueryEvent, QueryHandle, SearchRequest};
use mediadex_core::media::CollectBy;
use mediadex_core::{IndexError, LoaderSettings, MediaRecord, MediaView};
use mediadex_model::{FileHash, ServiceKey};
use tokio_util::sync::CancellationToken;

use support::{RecordBuilder, context, hash, sizes};

/// Storage double holding a fixed set of records.
struct FixedSource {
    records: Vec<MediaRecord>,
    stall: bool,
}

impl FixedSource {
    fn with_sizes(sizes: &[u64]) -> Self {
        let records = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| RecordBuilder::new(&format!("file-{i}")).size(*size).build())
            .collect();
        Self {
            records,
            stall: false,
        }
    }

    fn stalled() -> Self {
        Self {
            stall: true,
            ..Self::with_sizes(&[1, 2, 3])
        }
    }
}

#[async_trait]
impl MediaSource for FixedSource {
    async fn file_query_ids(&self, _request: &SearchRequest) -> anyhow::Result<Vec<FileHash>> {
        if self.stall {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(self.records.iter().map(MediaRecord::hash).collect())
    }

    async fn media_results(
        &self,
        _file_service_key: ServiceKey,
        hashes: &[FileHash],
    ) -> anyhow::Result<Vec<MediaRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|record| hashes.contains(&record.hash()))
            .cloned()
            .collect())
    }
}

fn in_order(chunk_size: usize) -> LoaderSettings {
    LoaderSettings {
        chunk_size,
        shuffle: false,
        limit: None,
    }
}

#[tokio::test]
async fn loads_a_query_into_a_view() {
    let source = Arc::new(FixedSource::with_sizes(&[50, 10, 40, 20, 30, 60, 70]));
    let handle = QueryHandle::spawn(source, SearchRequest::new(ServiceKey::LOCAL_FILE), in_order(3));

    let mut view = MediaView::new(context(), ServiceKey::LOCAL_FILE);
    let applied = handle.load_into(&mut view, 2).await.unwrap();

    assert_eq!(applied, 7);
    assert_eq!(view.len(), 7);
    assert_eq!(sizes(view.group()), vec![10, 20, 30, 40, 50, 60, 70]);
}

#[tokio::test]
async fn events_stream_reports_progress_then_results() {
    let source = Arc::new(FixedSource::with_sizes(&[1, 2, 3, 4, 5]));
    let handle = QueryHandle::spawn(source, SearchRequest::new(ServiceKey::LOCAL_FILE), in_order(2));
    let query_key = handle.query_key;

    let events: Vec<QueryEvent> = handle.into_stream().collect().await;
    let progress: Vec<(usize, usize)> = events
        .iter()
        .filter_map(|event| match event {
            QueryEvent::Progress { loaded, total, .. } => Some((*loaded, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(2, 5), (4, 5), (5, 5)]);

    match events.last() {
        Some(QueryEvent::Finished { query_key: key, records }) => {
            assert_eq!(*key, query_key);
            assert_eq!(records.len(), 5);
        }
        other => panic!("expected finished event, got {other:?}"),
    }
}

#[tokio::test]
async fn limit_caps_the_result_count() {
    let source = Arc::new(FixedSource::with_sizes(&[1, 2, 3, 4, 5, 6]));
    let settings = LoaderSettings {
        chunk_size: 4,
        shuffle: true,
        limit: Some(3),
    };
    let handle = QueryHandle::spawn(source, SearchRequest::new(ServiceKey::LOCAL_FILE), settings);

    let mut view = MediaView::new(context(), ServiceKey::LOCAL_FILE);
    assert_eq!(handle.load_into(&mut view, 10).await.unwrap(), 3);
    assert_eq!(view.group().num_files(), 3);
}

#[tokio::test]
async fn cancelling_leaves_the_view_untouched() {
    let handle = QueryHandle::spawn(
        Arc::new(FixedSource::stalled()),
        SearchRequest::new(ServiceKey::LOCAL_FILE),
        in_order(1),
    );
    handle.cancel();
    assert!(handle.token().is_cancelled());

    let mut view = MediaView::new(context(), ServiceKey::LOCAL_FILE);
    let result = handle.load_into(&mut view, 1).await;

    assert!(matches!(result, Err(IndexError::Cancelled(_))));
    assert!(view.is_empty());
}

#[tokio::test]
async fn chunked_batches_are_grouped_then_sorted_once() {
    let mut view = MediaView::new(context(), ServiceKey::LOCAL_FILE);
    view.group_mut().collect(Some(CollectBy::namespaces(["series"])));
    let batch = vec![
        RecordBuilder::new("x1").size(50).tag("series:x").build(),
        RecordBuilder::new("y1").size(10).tag("series:y").build(),
        RecordBuilder::new("x2").size(5).tag("series:x").build(),
        RecordBuilder::new("z1").size(30).tag("series:z").build(),
    ];

    let applied = view
        .apply_in_chunks(batch, 2, &CancellationToken::new())
        .await;

    assert_eq!(applied, 4);
    assert_eq!(sizes(view.group()), vec![10, 30, 55]);
    assert_eq!(view.group().node_for_hash(&hash("x2")).unwrap().num_files(), 2);
}
