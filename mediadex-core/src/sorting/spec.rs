use std::rc::Rc;
use std::sync::Arc;

use mediadex_model::{ServiceKey, ServiceType};
use serde::{Deserialize, Serialize};

use super::keys::NodeSortKey;
use crate::context::IndexContext;
use crate::index::KeyFn;
use crate::media::MediaNode;
use crate::services::ServiceDirectory;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn reverse(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Built-in sort criteria that need no extra parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemSort {
    FileSize,
    Duration,
    ImportTime,
    Mime,
    Random,
    Width,
    Height,
    Ratio,
    NumPixels,
    NumTags,
}

impl SystemSort {
    fn label(&self) -> &'static str {
        match self {
            SystemSort::FileSize => "filesize",
            SystemSort::Duration => "duration",
            SystemSort::ImportTime => "time imported",
            SystemSort::Mime => "mime",
            SystemSort::Random => "random",
            SystemSort::Width => "width",
            SystemSort::Height => "height",
            SystemSort::Ratio => "resolution ratio",
            SystemSort::NumPixels => "number of pixels",
            SystemSort::NumTags => "number of tags",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SortType {
    System(SystemSort),
    /// Compare the subtags found under each namespace, in order.
    Namespaces(Vec<String>),
    Rating(ServiceKey),
}

/// A sort criterion plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub sort_type: SortType,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(sort_type: SortType, order: SortOrder) -> Self {
        Self { sort_type, order }
    }

    pub fn system(sort: SystemSort, order: SortOrder) -> Self {
        Self::new(SortType::System(sort), order)
    }

    /// Whether flipping the direction means anything to a user.
    pub fn can_asc(&self) -> bool {
        !matches!(
            self.sort_type,
            SortType::System(SystemSort::Mime | SystemSort::Random) | SortType::Namespaces(_)
        )
    }

    pub fn sort_type_string(&self, services: &dyn ServiceDirectory) -> String {
        let detail = match &self.sort_type {
            SortType::System(sort) => sort.label().to_string(),
            SortType::Namespaces(namespaces) => namespaces.join("-"),
            SortType::Rating(key) => services
                .service_name(key)
                .unwrap_or_else(|| "unknown service".to_string()),
        };
        format!("sort by {detail}")
    }

    /// Labels for the (ascending, descending) choices.
    pub fn sort_asc_strings(&self) -> (&'static str, &'static str) {
        match &self.sort_type {
            SortType::System(sort) => match sort {
                SystemSort::FileSize => ("smallest first", "largest first"),
                SystemSort::Duration => ("shortest first", "longest first"),
                SystemSort::ImportTime => ("oldest first", "newest first"),
                SystemSort::Mime => ("mime", "mime"),
                SystemSort::Random => ("random", "random"),
                SystemSort::Width => ("slimmest first", "widest first"),
                SystemSort::Height => ("shortest first", "tallest first"),
                SystemSort::Ratio => ("tallest first", "widest first"),
                SystemSort::NumPixels | SystemSort::NumTags => ("ascending", "descending"),
            },
            _ => ("ascending", "descending"),
        }
    }

    /// Key extractor for nodes shown under `file_service_key`.
    pub fn key_fn(
        &self,
        ctx: &Arc<IndexContext>,
        file_service_key: ServiceKey,
    ) -> KeyFn<MediaNode, NodeSortKey> {
        match &self.sort_type {
            SortType::System(sort) => system_key_fn(*sort, ctx, file_service_key),
            SortType::Namespaces(namespaces) => {
                let ctx = Arc::clone(ctx);
                let namespaces = namespaces.clone();
                Rc::new(move |node: &MediaNode| {
                    node.with_tags(|tags| {
                        NodeSortKey::Namespaces(
                            tags.comparable_namespace_slice(&namespaces, ctx.siblings()),
                        )
                    })
                })
            }
            SortType::Rating(service_key) => {
                let service_key = *service_key;
                Rc::new(move |node: &MediaNode| {
                    node.with_ratings(|ratings| NodeSortKey::float(ratings.rating(&service_key)))
                })
            }
        }
    }
}

fn system_key_fn(
    sort: SystemSort,
    ctx: &Arc<IndexContext>,
    file_service_key: ServiceKey,
) -> KeyFn<MediaNode, NodeSortKey> {
    match sort {
        SystemSort::FileSize => Rc::new(|node: &MediaNode| NodeSortKey::count(node.sort_size())),
        SystemSort::Duration => Rc::new(|node: &MediaNode| NodeSortKey::count(node.duration_ms())),
        SystemSort::ImportTime => {
            let timestamp_key = if ctx.services().service_type(&file_service_key)
                == Some(ServiceType::LocalFileDomain)
            {
                ServiceKey::COMBINED_LOCAL_FILE
            } else {
                file_service_key
            };
            Rc::new(move |node: &MediaNode| {
                NodeSortKey::float(node.timestamp(&timestamp_key).map(|ts| ts as f64))
            })
        }
        SystemSort::Mime => Rc::new(|node: &MediaNode| NodeSortKey::Mime(node.mime())),
        SystemSort::Random => Rc::new(|_: &MediaNode| NodeSortKey::Random(rand::random())),
        SystemSort::Width => Rc::new(|node: &MediaNode| {
            NodeSortKey::count(node.resolution().map(|(width, _)| u64::from(width)))
        }),
        SystemSort::Height => Rc::new(|node: &MediaNode| {
            NodeSortKey::count(node.resolution().map(|(_, height)| u64::from(height)))
        }),
        SystemSort::Ratio => Rc::new(|node: &MediaNode| NodeSortKey::float(node.ratio())),
        SystemSort::NumPixels => Rc::new(|node: &MediaNode| NodeSortKey::count(node.num_pixels())),
        SystemSort::NumTags => {
            let ctx = Arc::clone(ctx);
            Rc::new(move |node: &MediaNode| {
                node.with_tags(|tags| {
                    let count =
                        tags.num_tags(ServiceKey::COMBINED_TAG, true, true, ctx.siblings());
                    NodeSortKey::count(Some(count as u64))
                })
            })
        }
    }
}
