//! Service lookups injected into the index.

use std::collections::{HashMap, HashSet};
use std::fmt::{self, Debug};
use std::sync::{PoisonError, RwLock};

use mediadex_model::{ServiceInfo, ServiceKey, ServiceType};
use tracing::{debug, warn};

use crate::error::{IndexError, Result};

/// Read access to the client's configured services.
pub trait ServiceDirectory: Send + Sync + Debug {
    fn service(&self, key: &ServiceKey) -> Option<ServiceInfo>;

    fn services(&self) -> Vec<ServiceInfo>;

    fn require_service(&self, key: &ServiceKey) -> Result<ServiceInfo> {
        self.service(key).ok_or(IndexError::UnknownService(*key))
    }

    fn service_type(&self, key: &ServiceKey) -> Option<ServiceType> {
        self.service(key).map(|info| info.service_type)
    }

    fn service_name(&self, key: &ServiceKey) -> Option<String> {
        self.service(key).map(|info| info.name)
    }

    fn services_of_types(&self, types: &[ServiceType]) -> Vec<ServiceInfo> {
        self.services()
            .into_iter()
            .filter(|info| types.contains(&info.service_type))
            .collect()
    }

    fn service_keys_of_types(&self, types: &[ServiceType]) -> HashSet<ServiceKey> {
        self.services_of_types(types)
            .into_iter()
            .map(|info| info.key)
            .collect()
    }
}

/// A fixed set of services. Starts out with the well-known ones.
#[derive(Debug, Clone)]
pub struct InMemoryServiceDirectory {
    services: HashMap<ServiceKey, ServiceInfo>,
}

impl Default for InMemoryServiceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryServiceDirectory {
    pub fn new() -> Self {
        Self::from_services(Vec::new())
    }

    pub fn from_services(services: impl IntoIterator<Item = ServiceInfo>) -> Self {
        let services = ServiceInfo::well_known()
            .into_iter()
            .chain(services)
            .map(|info| (info.key, info))
            .collect();
        Self { services }
    }

    pub fn with_service(mut self, info: ServiceInfo) -> Self {
        self.services.insert(info.key, info);
        self
    }
}

impl ServiceDirectory for InMemoryServiceDirectory {
    fn service(&self, key: &ServiceKey) -> Option<ServiceInfo> {
        self.services.get(key).cloned()
    }

    fn services(&self) -> Vec<ServiceInfo> {
        self.services.values().cloned().collect()
    }
}

/// Where a [`CachedServiceDirectory`] gets its snapshot from.
#[cfg_attr(test, mockall::automock)]
pub trait ServiceSource: Send + Sync {
    fn fetch_services(&self) -> anyhow::Result<Vec<ServiceInfo>>;
}

/// Snapshot of a fallible [`ServiceSource`].
///
/// Refresh failures are logged and the previous snapshot is kept, so a flaky
/// source never blocks whoever is maintaining the index.
pub struct CachedServiceDirectory {
    source: Box<dyn ServiceSource>,
    snapshot: RwLock<InMemoryServiceDirectory>,
}

impl Debug for CachedServiceDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedServiceDirectory")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl CachedServiceDirectory {
    pub fn new(source: Box<dyn ServiceSource>) -> Self {
        let directory = Self {
            source,
            snapshot: RwLock::new(InMemoryServiceDirectory::new()),
        };
        directory.refresh();
        directory
    }

    /// Returns whether the snapshot was replaced.
    pub fn refresh(&self) -> bool {
        match self.source.fetch_services() {
            Ok(services) => {
                debug!(count = services.len(), "refreshed service directory");
                let fresh = InMemoryServiceDirectory::from_services(services);
                *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = fresh;
                true
            }
            Err(err) => {
                warn!(error = %err, "service refresh failed; keeping previous snapshot");
                false
            }
        }
    }
}

impl ServiceDirectory for CachedServiceDirectory {
    fn service(&self, key: &ServiceKey) -> Option<ServiceInfo> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .service(key)
    }

    fn services(&self) -> Vec<ServiceInfo> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .services()
    }
}
