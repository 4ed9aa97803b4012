//! Grouping criteria for collections.

use std::collections::BTreeSet;

use mediadex_model::ServiceKey;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::record::MediaRecord;
use crate::siblings::SiblingResolver;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CollectEntry {
    Namespace(String),
    Rating(ServiceKey),
}

/// Records agreeing on every listed namespace and rating are grouped.
/// An empty criterion means no grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectBy {
    entries: Vec<CollectEntry>,
}

impl CollectBy {
    pub fn new(entries: impl IntoIterator<Item = CollectEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn namespaces<S: Into<String>>(namespaces: impl IntoIterator<Item = S>) -> Self {
        Self::new(namespaces.into_iter().map(|ns| CollectEntry::Namespace(ns.into())))
    }

    pub fn entries(&self) -> &[CollectEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grouping key of one record.
    pub fn key_for(&self, record: &MediaRecord, siblings: &dyn SiblingResolver) -> CollectKey {
        let mut key = CollectKey::default();
        for entry in &self.entries {
            match entry {
                CollectEntry::Namespace(namespace) => key.namespaces.push(
                    record
                        .tags()
                        .namespace_slice(std::slice::from_ref(namespace), siblings),
                ),
                CollectEntry::Rating(service_key) => key
                    .ratings
                    .push(record.ratings().rating(service_key).map(OrderedFloat)),
            }
        }
        key
    }
}

/// Records without any tag in a namespace share the empty slice for it, so
/// they still group together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CollectKey {
    namespaces: Vec<BTreeSet<String>>,
    ratings: Vec<Option<OrderedFloat<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratings::RatingState;
    use crate::siblings::NoSiblings;
    use crate::tags::{StatusesToTags, TagState};
    use mediadex_model::{FileHash, FileMetadata, Mime};
    use std::collections::HashMap;

    fn record(seed: &str, tags: &[&str], rating: Option<f64>) -> MediaRecord {
        let mut statuses = StatusesToTags::default();
        statuses.current.extend(tags.iter().map(|t| t.to_string()));
        let stars = ServiceKey::from_name("stars");
        MediaRecord::from_file(FileMetadata::new(FileHash::of_content(seed.as_bytes()), Mime::ImagePng))
            .with_tags(TagState::new(HashMap::from([(ServiceKey::LOCAL_TAG, statuses)])))
            .with_ratings(RatingState::new(rating.map(|r| (stars, r)).into_iter().collect()))
    }

    #[test]
    fn key_ignores_other_namespaces() {
        let by = CollectBy::namespaces(["series"]);
        let a = by.key_for(&record("a", &["series:x", "page:1"], None), &NoSiblings);
        let b = by.key_for(&record("b", &["series:x", "page:2"], None), &NoSiblings);
        let c = by.key_for(&record("c", &["series:y"], None), &NoSiblings);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn untagged_records_share_a_key() {
        let by = CollectBy::namespaces(["series"]);
        let a = by.key_for(&record("a", &["blue"], None), &NoSiblings);
        let b = by.key_for(&record("b", &[], None), &NoSiblings);
        assert_eq!(a, b);
    }

    #[test]
    fn ratings_take_part_in_the_key() {
        let by = CollectBy::new([CollectEntry::Rating(ServiceKey::from_name("stars"))]);
        let a = by.key_for(&record("a", &[], Some(0.5)), &NoSiblings);
        let b = by.key_for(&record("b", &[], Some(0.5)), &NoSiblings);
        let c = by.key_for(&record("c", &[], None), &NoSiblings);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
