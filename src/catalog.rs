//! Service catalog endpoint selection
//!
//! A [`ServiceCatalog`] arrives with every issued token. Selection narrows it
//! down to exactly one endpoint; anything other than exactly one is a catalog
//! error kind, never a silent guess.

use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::types::{Endpoint, Service, ServiceCatalog};

/// The default interface when a filter does not name one.
const DEFAULT_INTERFACE: &str = "public";

/// Criteria for picking one endpoint out of the catalog
#[derive(Debug, Clone, Default)]
pub struct EndpointFilter {
    /// Service type to look up ("identity", "compute", ...)
    pub service_type: String,
    /// Restrict to a service with this deployment name
    pub service_name: Option<String>,
    /// Endpoint interface; "public" when unset
    pub interface: Option<String>,
    /// Restrict to endpoints of this region
    pub region: Option<String>,
}

impl EndpointFilter {
    /// A filter matching any public endpoint of the given service type.
    pub fn new(service_type: &str) -> Self {
        EndpointFilter {
            service_type: service_type.to_string(),
            ..Default::default()
        }
    }

    /// Restrict to a service with this name.
    pub fn service_name(mut self, name: &str) -> Self {
        self.service_name = Some(name.to_string());
        self
    }

    /// Select a non-default interface.
    pub fn interface(mut self, interface: &str) -> Self {
        self.interface = Some(interface.to_string());
        self
    }

    /// Restrict to endpoints of this region.
    pub fn region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }
}

impl ServiceCatalog {
    /// Whether the catalog has no services at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Find the one service matching a type and optional name.
    pub fn service(&self, service_type: &str, name: Option<&str>) -> Result<&Service> {
        if self.0.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let mut matches = self.0.iter().filter(|service| {
            service.service_type == service_type
                && name.map_or(true, |n| service.name.as_deref() == Some(n))
        });
        let first = matches.next().ok_or(Error::EndpointNotFound)?;
        if matches.next().is_some() {
            return Err(Error::NoUniqueMatch);
        }
        Ok(first)
    }

    /// Find the one endpoint satisfying the filter.
    ///
    /// More than one surviving candidate is reported as
    /// [`Error::AmbiguousEndpoints`] carrying the candidates in catalog
    /// order.
    pub fn endpoint_for(&self, filter: &EndpointFilter) -> Result<&Endpoint> {
        let service = self.service(&filter.service_type, filter.service_name.as_deref())?;
        let interface = filter.interface.as_deref().unwrap_or(DEFAULT_INTERFACE);
        let candidates: Vec<&Endpoint> = service
            .endpoints
            .iter()
            .filter(|endpoint| endpoint.interface == interface)
            .filter(|endpoint| {
                filter
                    .region
                    .as_deref()
                    .map_or(true, |region| endpoint.region.as_deref() == Some(region))
            })
            .collect();
        debug!(
            service_type = %filter.service_type,
            interface,
            candidates = candidates.len(),
            "catalog endpoint lookup"
        );
        match candidates.len() {
            0 => Err(Error::EndpointNotFound),
            1 => Ok(candidates[0]),
            _ => Err(Error::AmbiguousEndpoints {
                endpoints: candidates.into_iter().cloned().collect(),
            }),
        }
    }

    /// The URL of the one endpoint satisfying the filter, parsed.
    pub fn url_for(&self, filter: &EndpointFilter) -> Result<Url> {
        let endpoint = self.endpoint_for(filter)?;
        Url::parse(&endpoint.url).map_err(|e| {
            Error::Catalog(format!(
                "Endpoint for {} has an unusable URL {:?}: {}",
                filter.service_type, endpoint.url, e
            ))
        })
    }
}
