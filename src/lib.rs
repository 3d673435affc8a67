//! A modern HTTP/2 client for identity service APIs
//!
//! This library provides a high-level async client for an identity service:
//! token issuance through pluggable auth methods, service catalog endpoint
//! selection and API version discovery, all over HTTP/2.
//!
//! Its backbone is a single layered error taxonomy: every fault the client
//! detects, from a refused socket to an ambiguous catalog entry, maps to
//! exactly one [`Error`] kind that callers can branch on.
//!
//! # Features
//! - HTTP/2 with connection pooling, plaintext or TLS
//! - Certificate pinning and custom CA bundles
//! - Pluggable auth (password, token)
//! - Service catalog endpoint selection
//! - API version discovery and negotiation
//! - One total status-code-to-error-kind mapping
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use identity_client::auth::PasswordAuth;
//! use identity_client::{Client, EndpointFilter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), identity_client::Error> {
//!     let client = Client::new("http://localhost:5000")?
//!         .with_plugin(Box::new(PasswordAuth::new("alice", "hunter2")));
//!
//!     let token = client.authenticate().await?;
//!     println!("token expires at {:?}", token.expires_at);
//!
//!     let url = client.endpoint_for(&token, &EndpointFilter::new("object-store"))?;
//!     println!("object store: {}", url);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod auth;
pub mod catalog;
pub mod cert;
pub mod client;
pub mod discovery;
pub mod error;
pub mod types;

pub use catalog::EndpointFilter;
pub use client::{Client, ClientConfig};
pub use discovery::VersionDoc;
pub use error::{Error, ErrorCategory, HttpError, HttpKind, Result};
pub use types::*;
