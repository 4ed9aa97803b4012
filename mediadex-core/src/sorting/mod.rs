//! Sorting for media views
//!
//! This module provides:
//! - Sort criteria and their user-facing labels
//! - Sort key extraction for singletons and collections
//! - Chained sorting with a fallback criterion

mod keys;
mod spec;
mod strategy;

pub use keys::NodeSortKey;
pub use spec::{SortOrder, SortSpec, SortType, SystemSort};
pub use strategy::ChainedSort;
