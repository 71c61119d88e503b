//! Upstream registry.
//!
//! # Responsibilities
//! - Map each service to its endpoint
//! - Bound concurrent exchanges per service with permits
//! - Provide guards whose drop releases the slot

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::config::schema::{PoolConfig, ServicesConfig};
use crate::config::validation::ValidationError;
use crate::error::UpstreamError;
use crate::routing::ServiceId;
use crate::upstream::endpoint::ServiceEndpoint;

/// One backend service and its connection slots.
#[derive(Debug)]
pub struct Upstream {
    pub endpoint: ServiceEndpoint,
    /// Maximum concurrent exchanges allowed.
    pub max_connections: usize,
    slots: Arc<Semaphore>,
}

impl Upstream {
    pub fn new(endpoint: ServiceEndpoint, max_connections: usize) -> Self {
        Self {
            endpoint,
            max_connections,
            slots: Arc::new(Semaphore::new(max_connections)),
        }
    }

    /// Number of exchanges currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.max_connections - self.slots.available_permits()
    }

    /// Wait up to `wait` for a free slot.
    pub async fn acquire(&self, wait: Duration) -> Result<UpstreamPermit, UpstreamError> {
        let saturated = || UpstreamError::Saturated {
            service: self.endpoint.id.to_string(),
        };
        match tokio::time::timeout(wait, self.slots.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(UpstreamPermit {
                service: self.endpoint.id,
                _permit: permit,
            }),
            // Closed semaphore or elapsed wait both mean no slot.
            Ok(Err(_)) | Err(_) => Err(saturated()),
        }
    }
}

/// A RAII guard for one upstream slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct UpstreamPermit {
    service: ServiceId,
    _permit: OwnedSemaphorePermit,
}

impl UpstreamPermit {
    pub fn service(&self) -> ServiceId {
        self.service
    }
}

/// Read-only map of every backend, built at startup.
#[derive(Debug)]
pub struct UpstreamRegistry {
    upstreams: HashMap<ServiceId, Arc<Upstream>>,
}

impl UpstreamRegistry {
    /// Resolve every service address. Any bad address fails the whole build.
    pub fn from_config(services: &ServicesConfig, pool: &PoolConfig) -> Result<Self, ValidationError> {
        let mut upstreams = HashMap::with_capacity(ServiceId::ALL.len());
        for id in ServiceId::ALL {
            let endpoint = ServiceEndpoint::parse(id, services.url_for(id))?;
            upstreams.insert(
                id,
                Arc::new(Upstream::new(endpoint, pool.max_connections_per_service)),
            );
        }
        Ok(Self { upstreams })
    }

    /// Look up a service. Every `ServiceId` is present after `from_config`.
    pub fn get(&self, id: ServiceId) -> Option<Arc<Upstream>> {
        self.upstreams.get(&id).cloned()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &ServiceEndpoint> {
        ServiceId::ALL
            .into_iter()
            .filter_map(|id| self.upstreams.get(&id))
            .map(|u| &u.endpoint)
    }
}
