//! Worker-side loading of search results.
//!
//! A query runs off the interactive thread: ids are fetched, optionally
//! shuffled and truncated, then records are read a chunk at a time. Progress
//! and the finished batch travel back over a channel; the interactive side
//! applies the batch to a [`MediaView`](crate::media::MediaView).

use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use mediadex_model::{FileHash, QueryKey, ServiceKey};
use rand::seq::SliceRandom;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{IndexError, Result};
use crate::media::MediaView;
use crate::options::LoaderSettings;
use crate::record::MediaRecord;

/// What a search asks storage for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    pub query_key: QueryKey,
    pub file_service_key: ServiceKey,
}

impl SearchRequest {
    pub fn new(file_service_key: ServiceKey) -> Self {
        Self {
            query_key: QueryKey::new(),
            file_service_key,
        }
    }
}

/// Storage collaborator answering searches.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Every file matching the search.
    async fn file_query_ids(&self, request: &SearchRequest) -> anyhow::Result<Vec<FileHash>>;

    /// Full records for some of those files.
    async fn media_results(
        &self,
        file_service_key: ServiceKey,
        hashes: &[FileHash],
    ) -> anyhow::Result<Vec<MediaRecord>>;
}

#[derive(Debug)]
pub enum QueryEvent {
    Progress {
        query_key: QueryKey,
        loaded: usize,
        total: usize,
    },
    Finished {
        query_key: QueryKey,
        records: Vec<MediaRecord>,
    },
    Cancelled {
        query_key: QueryKey,
    },
}

/// Run one search to completion or cancellation, reporting on `events`.
/// Returns the number of records loaded.
pub async fn run_query(
    source: Arc<dyn MediaSource>,
    request: SearchRequest,
    settings: LoaderSettings,
    token: CancellationToken,
    events: mpsc::Sender<QueryEvent>,
) -> Result<usize> {
    let query_key = request.query_key;

    let mut ids = tokio::select! {
        _ = token.cancelled() => return Err(report_cancelled(&events, query_key).await),
        ids = source.file_query_ids(&request) => ids?,
    };
    if settings.shuffle {
        ids.shuffle(&mut rand::rng());
    }
    if let Some(limit) = settings.limit {
        ids.truncate(limit);
    }

    let total = ids.len();
    let mut records = Vec::with_capacity(total);
    for chunk in ids.chunks(settings.chunk_size.max(1)) {
        if token.is_cancelled() {
            return Err(report_cancelled(&events, query_key).await);
        }
        let batch = tokio::select! {
            _ = token.cancelled() => return Err(report_cancelled(&events, query_key).await),
            batch = source.media_results(request.file_service_key, chunk) => batch?,
        };
        records.extend(batch);
        trace!(%query_key, loaded = records.len(), total, "query chunk loaded");

        let progress = QueryEvent::Progress {
            query_key,
            loaded: records.len(),
            total,
        };
        if events.send(progress).await.is_err() {
            warn!(%query_key, "query listener went away");
            return Err(IndexError::Cancelled(query_key.to_string()));
        }
    }

    let loaded = records.len();
    debug!(%query_key, loaded, "query finished");
    events
        .send(QueryEvent::Finished { query_key, records })
        .await
        .map_err(|_| IndexError::Cancelled(query_key.to_string()))?;
    Ok(loaded)
}

async fn report_cancelled(events: &mpsc::Sender<QueryEvent>, query_key: QueryKey) -> IndexError {
    debug!(%query_key, "query cancelled");
    // The listener may already be gone; nothing left to tell it.
    let _ = events.send(QueryEvent::Cancelled { query_key }).await;
    IndexError::Cancelled(query_key.to_string())
}

/// A query running on its own task.
#[derive(Debug)]
pub struct QueryHandle {
    pub query_key: QueryKey,
    token: CancellationToken,
    events: mpsc::Receiver<QueryEvent>,
    task: JoinHandle<Result<usize>>,
}

impl QueryHandle {
    pub fn spawn(
        source: Arc<dyn MediaSource>,
        request: SearchRequest,
        settings: LoaderSettings,
    ) -> Self {
        let token = CancellationToken::new();
        let (tx, events) = mpsc::channel(16);
        let task = tokio::spawn(run_query(source, request, settings, token.clone(), tx));
        Self {
            query_key: request.query_key,
            token,
            events,
            task,
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub async fn next_event(&mut self) -> Option<QueryEvent> {
        self.events.recv().await
    }

    /// Events as a stream; the worker keeps running until the stream ends.
    pub fn into_stream(self) -> impl Stream<Item = QueryEvent> {
        futures::stream::unfold(self.events, |mut events| async move {
            events.recv().await.map(|event| (event, events))
        })
    }

    /// Drain events into `view` until the query finishes or is cancelled.
    /// Returns how many records reached the view.
    pub async fn load_into(mut self, view: &mut MediaView, chunk_size: usize) -> Result<usize> {
        let mut applied = 0;
        while let Some(event) = self.events.recv().await {
            match event {
                QueryEvent::Progress { loaded, total, .. } => {
                    trace!(query_key = %self.query_key, loaded, total, "loading");
                }
                QueryEvent::Finished { records, .. } => {
                    applied = view.apply_in_chunks(records, chunk_size, &self.token).await;
                    break;
                }
                QueryEvent::Cancelled { .. } => break,
            }
        }

        match self.task.await {
            Ok(Ok(_)) if self.token.is_cancelled() => {
                Err(IndexError::Cancelled(self.query_key.to_string()))
            }
            Ok(Ok(_)) => Ok(applied),
            Ok(Err(err)) => Err(err),
            Err(join) => Err(IndexError::Source(anyhow::anyhow!(
                "query task failed: {join}"
            ))),
        }
    }
}
