//! Data types for the identity client

use serde::{Deserialize, Serialize};

/// One addressable endpoint of a catalog service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Which audience the endpoint serves ("public", "internal", "admin")
    pub interface: String,
    /// Region the endpoint lives in, when the deployment is regionalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Base URL of the endpoint
    pub url: String,
    /// Server-assigned endpoint id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Endpoint {
    /// Shorthand constructor for an endpoint with no region or id.
    pub fn new(interface: &str, url: &str) -> Self {
        Endpoint {
            interface: interface.to_string(),
            region: None,
            url: url.to_string(),
            id: None,
        }
    }

    /// Same endpoint with a region attached.
    pub fn in_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }
}

/// One service entry of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Well-known service type ("identity", "compute", "object-store", ...)
    #[serde(rename = "type")]
    pub service_type: String,
    /// Deployment-chosen service name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Endpoints offered by this service
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// The service catalog delivered alongside an issued token
///
/// Endpoint selection lives in [`crate::catalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceCatalog(pub Vec<Service>);

/// One API version advertised by a version discovery document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Version identifier as advertised ("v3.14", "v2.0", ...)
    pub id: String,
    /// Lifecycle status ("stable", "CURRENT", "SUPPORTED", "DEPRECATED", ...)
    #[serde(default)]
    pub status: String,
    /// Links to the version's own endpoint
    #[serde(default)]
    pub links: Vec<VersionLink>,
}

/// One link of a [`Version`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionLink {
    /// Link relation ("self", "describedby", ...)
    pub rel: String,
    /// Link target
    pub href: String,
}

impl Version {
    /// The version's own URL, when it advertises one.
    pub fn self_href(&self) -> Option<&str> {
        self.links
            .iter()
            .find(|link| link.rel == "self")
            .map(|link| link.href.as_str())
    }
}

/// An issued token: its id (from the subject-token header), expiry and the
/// catalog the server scoped it to
#[derive(Debug, Clone)]
pub struct Token {
    /// The opaque token id presented back as `X-Auth-Token`
    pub id: String,
    /// Expiry timestamp as reported by the server
    pub expires_at: Option<String>,
    /// The catalog scoped to this token
    pub catalog: ServiceCatalog,
}

/// Body of a token response, `{"token": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenEnvelope {
    pub token: TokenDoc,
}

/// The inner token document
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenDoc {
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub catalog: ServiceCatalog,
}

/// One user record, `{"user": {...}}` unwrapped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned user id
    pub id: String,
    /// User name
    pub name: String,
    /// Owning domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
    /// Whether the account is enabled
    #[serde(default)]
    pub enabled: bool,
}

/// Body of a user response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: User,
}
