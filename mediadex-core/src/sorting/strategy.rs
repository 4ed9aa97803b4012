//! Composable multi-pass sorting over a [`SortedIndex`].

use std::sync::Arc;

use mediadex_model::ServiceKey;

use super::keys::NodeSortKey;
use super::spec::SortSpec;
use crate::context::IndexContext;
use crate::index::SortedIndex;
use crate::media::MediaNode;

/// Primary criterion first, tie-breakers after it.
#[derive(Debug, Clone, Default)]
pub struct ChainedSort {
    passes: Vec<SortSpec>,
}

impl ChainedSort {
    pub fn new(primary: SortSpec) -> Self {
        Self {
            passes: vec![primary],
        }
    }

    pub fn then_by(mut self, spec: SortSpec) -> Self {
        self.passes.push(spec);
        self
    }

    pub fn passes(&self) -> &[SortSpec] {
        &self.passes
    }

    pub fn apply(
        &self,
        index: &mut SortedIndex<MediaNode, NodeSortKey>,
        ctx: &Arc<IndexContext>,
        file_service_key: ServiceKey,
    ) {
        // Last pass wins; the stable sort keeps earlier passes as tie order.
        for spec in self.passes.iter().rev() {
            index.sort_by(spec.key_fn(ctx, file_service_key), spec.order);
        }
    }
}
