//! Tag sibling resolution: rewriting tags to their canonical synonym before
//! they enter the combined view.

use std::collections::HashMap;
use std::fmt::Debug;

use mediadex_model::ServiceKey;

use crate::tags::StatusesToTags;

pub trait SiblingResolver: Send + Sync + Debug {
    /// The canonical form of `tag` under `service_key`'s sibling rules.
    fn canonical_tag(&self, service_key: ServiceKey, tag: &str) -> String;

    fn collapse_statuses_to_tags(
        &self,
        service_key: ServiceKey,
        statuses: &StatusesToTags,
    ) -> StatusesToTags {
        statuses.map_tags(|tag| self.canonical_tag(service_key, tag))
    }
}

/// Leaves every tag untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSiblings;

impl SiblingResolver for NoSiblings {
    fn canonical_tag(&self, _service_key: ServiceKey, tag: &str) -> String {
        tag.to_string()
    }
}

/// Fixed sibling pairs, either for every service or scoped to one.
#[derive(Debug, Clone, Default)]
pub struct StaticSiblings {
    global: HashMap<String, String>,
    per_service: HashMap<ServiceKey, HashMap<String, String>>,
}

impl StaticSiblings {
    pub fn with_pair(mut self, bad: impl Into<String>, good: impl Into<String>) -> Self {
        self.global.insert(bad.into(), good.into());
        self
    }

    pub fn with_service_pair(
        mut self,
        service_key: ServiceKey,
        bad: impl Into<String>,
        good: impl Into<String>,
    ) -> Self {
        self.per_service
            .entry(service_key)
            .or_default()
            .insert(bad.into(), good.into());
        self
    }
}

impl SiblingResolver for StaticSiblings {
    fn canonical_tag(&self, service_key: ServiceKey, tag: &str) -> String {
        self.per_service
            .get(&service_key)
            .and_then(|pairs| pairs.get(tag))
            .or_else(|| self.global.get(tag))
            .cloned()
            .unwrap_or_else(|| tag.to_string())
    }
}
