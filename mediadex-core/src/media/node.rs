use std::collections::HashSet;

use mediadex_model::{FileHash, Mime, NodeId, ServiceKey};

use super::collection::MediaCollection;
use crate::index::IndexItem;
use crate::locations::LocationState;
use crate::ratings::RatingState;
use crate::record::{MediaRecord, SharedRecord};
use crate::tags::TagState;

/// One record as it appears in one view.
///
/// Two singletons over the same record are still different nodes; identity
/// is the node id, never the record.
#[derive(Debug)]
pub struct MediaSingleton {
    id: NodeId,
    record: SharedRecord,
}

impl MediaSingleton {
    pub fn new(record: SharedRecord) -> Self {
        Self {
            id: NodeId::new(),
            record,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn record(&self) -> &SharedRecord {
        &self.record
    }

    pub fn hash(&self) -> FileHash {
        self.record.borrow().hash()
    }

    /// Read the record without holding the borrow past `f`.
    pub fn with_record<R>(&self, f: impl FnOnce(&MediaRecord) -> R) -> R {
        f(&self.record.borrow())
    }
}

/// Entry in a media group: a single file or a collection of files.
#[derive(Debug)]
pub enum MediaNode {
    Singleton(MediaSingleton),
    Collection(Box<MediaCollection>),
}

impl IndexItem for MediaNode {
    type Id = NodeId;

    fn item_id(&self) -> NodeId {
        self.id()
    }
}

impl From<MediaSingleton> for MediaNode {
    fn from(singleton: MediaSingleton) -> Self {
        MediaNode::Singleton(singleton)
    }
}

impl From<MediaCollection> for MediaNode {
    fn from(collection: MediaCollection) -> Self {
        MediaNode::Collection(Box::new(collection))
    }
}

impl MediaNode {
    pub fn id(&self) -> NodeId {
        match self {
            MediaNode::Singleton(singleton) => singleton.id(),
            MediaNode::Collection(collection) => collection.id(),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, MediaNode::Collection(_))
    }

    pub fn as_singleton(&self) -> Option<&MediaSingleton> {
        match self {
            MediaNode::Singleton(singleton) => Some(singleton),
            MediaNode::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&MediaCollection> {
        match self {
            MediaNode::Collection(collection) => Some(collection.as_ref()),
            MediaNode::Singleton(_) => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut MediaCollection> {
        match self {
            MediaNode::Collection(collection) => Some(collection.as_mut()),
            MediaNode::Singleton(_) => None,
        }
    }

    /// Dissolve into the singletons it holds, keeping their identities.
    pub fn into_singletons(self) -> Vec<MediaSingleton> {
        match self {
            MediaNode::Singleton(singleton) => vec![singleton],
            MediaNode::Collection(collection) => (*collection).into_singletons(),
        }
    }

    /// The record that represents this node in a thumbnail grid.
    pub fn display_record(&self) -> Option<SharedRecord> {
        match self {
            MediaNode::Singleton(singleton) => Some(singleton.record().clone()),
            MediaNode::Collection(collection) => collection.members().first_record(),
        }
    }

    pub fn hashes(&self) -> HashSet<FileHash> {
        match self {
            MediaNode::Singleton(singleton) => HashSet::from([singleton.hash()]),
            MediaNode::Collection(collection) => collection.members().hashes().clone(),
        }
    }

    pub fn has_hash(&self, hash: &FileHash) -> bool {
        match self {
            MediaNode::Singleton(singleton) => singleton.hash() == *hash,
            MediaNode::Collection(collection) => collection.members().hashes().contains(hash),
        }
    }

    pub fn num_files(&self) -> usize {
        match self {
            MediaNode::Singleton(_) => 1,
            MediaNode::Collection(collection) => collection.members().num_files(),
        }
    }

    /// Every singleton at or below this node, in display order.
    pub fn flat_singletons(&self) -> Vec<&MediaSingleton> {
        match self {
            MediaNode::Singleton(singleton) => vec![singleton],
            MediaNode::Collection(collection) => collection.members().flat_media(),
        }
    }

    /// File size with unknown sizes counted as zero.
    pub fn size(&self) -> u64 {
        self.sort_size().unwrap_or(0)
    }

    /// File size as used for sorting; a collection always has a total.
    pub fn sort_size(&self) -> Option<u64> {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.file().size()),
            MediaNode::Collection(collection) => Some(collection.size()),
        }
    }

    pub fn is_size_definite(&self) -> bool {
        match self {
            MediaNode::Singleton(singleton) => {
                singleton.with_record(|r| r.file().size().is_some())
            }
            MediaNode::Collection(collection) => collection.is_size_definite(),
        }
    }

    pub fn duration_ms(&self) -> Option<u64> {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.file().duration_ms()),
            MediaNode::Collection(collection) => collection.duration_ms(),
        }
    }

    pub fn num_frames(&self) -> Option<u64> {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.file().num_frames()),
            MediaNode::Collection(collection) => collection.num_frames(),
        }
    }

    pub fn num_words(&self) -> Option<u64> {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.file().num_words()),
            MediaNode::Collection(collection) => collection.num_words(),
        }
    }

    pub fn mime(&self) -> Mime {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.mime()),
            MediaNode::Collection(_) => Mime::ApplicationClientCollection,
        }
    }

    /// Collections have no resolution of their own.
    pub fn resolution(&self) -> Option<(u32, u32)> {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.file().resolution()),
            MediaNode::Collection(_) => None,
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.file().ratio()),
            MediaNode::Collection(_) => None,
        }
    }

    pub fn num_pixels(&self) -> Option<u64> {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.file().num_pixels()),
            MediaNode::Collection(_) => None,
        }
    }

    pub fn has_inbox(&self) -> bool {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| r.inbox()),
            MediaNode::Collection(collection) => collection.has_inbox(),
        }
    }

    pub fn has_archive(&self) -> bool {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| !r.inbox()),
            MediaNode::Collection(collection) => collection.has_archive(),
        }
    }

    pub fn num_inbox(&self) -> usize {
        match self {
            MediaNode::Singleton(singleton) => usize::from(singleton.with_record(|r| r.inbox())),
            MediaNode::Collection(collection) => collection.members().num_inbox(),
        }
    }

    /// Collections do not carry timestamps.
    pub fn timestamp(&self, service_key: &ServiceKey) -> Option<i64> {
        match self {
            MediaNode::Singleton(singleton) => {
                singleton.with_record(|r| r.locations().timestamp(service_key))
            }
            MediaNode::Collection(_) => None,
        }
    }

    pub fn with_tags<R>(&self, f: impl FnOnce(&TagState) -> R) -> R {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| f(r.tags())),
            MediaNode::Collection(collection) => f(collection.tags()),
        }
    }

    pub fn with_locations<R>(&self, f: impl FnOnce(&LocationState) -> R) -> R {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| f(r.locations())),
            MediaNode::Collection(collection) => f(collection.locations()),
        }
    }

    pub fn with_ratings<R>(&self, f: impl FnOnce(&RatingState) -> R) -> R {
        match self {
            MediaNode::Singleton(singleton) => singleton.with_record(|r| f(r.ratings())),
            MediaNode::Collection(collection) => f(collection.ratings()),
        }
    }
}
