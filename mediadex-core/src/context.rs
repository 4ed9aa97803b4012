use std::sync::Arc;

use crate::options::ViewOptions;
use crate::services::{InMemoryServiceDirectory, ServiceDirectory};
use crate::siblings::{NoSiblings, SiblingResolver};

/// Collaborators every view needs, handed in at construction instead of
/// being looked up globally.
#[derive(Debug, Clone)]
pub struct IndexContext {
    services: Arc<dyn ServiceDirectory>,
    siblings: Arc<dyn SiblingResolver>,
    options: ViewOptions,
}

impl IndexContext {
    pub fn new(
        services: Arc<dyn ServiceDirectory>,
        siblings: Arc<dyn SiblingResolver>,
        options: ViewOptions,
    ) -> Arc<Self> {
        Arc::new(Self {
            services,
            siblings,
            options,
        })
    }

    /// Well-known services only, no siblings, default options.
    pub fn standalone() -> Arc<Self> {
        Self::new(
            Arc::new(InMemoryServiceDirectory::new()),
            Arc::new(NoSiblings),
            ViewOptions::default(),
        )
    }

    pub fn services(&self) -> &dyn ServiceDirectory {
        self.services.as_ref()
    }

    pub fn siblings(&self) -> &dyn SiblingResolver {
        self.siblings.as_ref()
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }
}
