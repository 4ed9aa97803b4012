//! Sort key type for comparing media nodes.
//!
//! Missing values become -1 so they collect at the front of an ascending
//! sort and at the back of a descending one.

use mediadex_model::Mime;
use ordered_float::OrderedFloat;

use crate::tags::SortableTag;

const MISSING: f64 = -1.0;

/// Within one sort pass every node yields the same variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeSortKey {
    Number(OrderedFloat<f64>),
    Mime(Mime),
    Random(u64),
    Namespaces(Vec<Vec<SortableTag>>),
}

impl NodeSortKey {
    pub fn missing() -> Self {
        NodeSortKey::Number(OrderedFloat(MISSING))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, NodeSortKey::Number(OrderedFloat(value)) if *value == MISSING)
    }

    pub fn float(value: Option<f64>) -> Self {
        NodeSortKey::Number(OrderedFloat(value.unwrap_or(MISSING)))
    }

    pub fn count(value: Option<u64>) -> Self {
        Self::float(value.map(|v| v as f64))
    }
}
