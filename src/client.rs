//! HTTP/2 client for identity services

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, Response, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;
use url::Url;

use crate::auth::AuthPlugin;
use crate::catalog::EndpointFilter;
use crate::cert;
use crate::discovery::VersionDoc;
use crate::error::{Error, Result};
use crate::types::{Token, TokenEnvelope, User, UserEnvelope, Version};

/// Characters allowed unencoded in URI path segments per RFC 3986.
/// Identity resource ids are single segments, so `/` gets encoded too.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a caller-supplied id for use as one URI path segment.
fn encode_segment(id: &str) -> String {
    utf8_percent_encode(id, PATH_SEGMENT).to_string()
}

/// Configuration options for the identity client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Identity server root URL (default: http://localhost:5000)
    pub auth_url: String,
    /// Request timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Optional server certificate fingerprint (SHA-256 hex) for pinning.
    /// Accepts hex with or without colons. Requires an https:// auth URL.
    pub ssl_fingerprint: Option<String>,
    /// Enable TLS verification (default: true).
    /// When false, the client accepts any certificate.
    pub reject_unauthorized: bool,
    /// Optional PEM bundle of CA certificates to trust instead of the
    /// built-in webpki roots.
    pub ca_bundle: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_url: "http://localhost:5000".to_string(),
            timeout_ms: 30000,
            ssl_fingerprint: None,
            reject_unauthorized: true,
            ca_bundle: None,
        }
    }
}

/// Certificate verifier that accepts exactly one pinned certificate,
/// identified by its SHA-256 fingerprint.
struct PinnedVerifier {
    expected: [u8; 32],
    provider: Arc<rustls::crypto::CryptoProvider>,
}

impl fmt::Debug for PinnedVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinnedVerifier")
            .field("expected", &hex::encode(self.expected))
            .finish()
    }
}

impl rustls::client::danger::ServerCertVerifier for PinnedVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        let actual = ring::digest::digest(&ring::digest::SHA256, end_entity.as_ref());
        if actual.as_ref() == self.expected {
            Ok(rustls::client::danger::ServerCertVerified::assertion())
        } else {
            Err(rustls::Error::General(format!(
                "Certificate fingerprint mismatch: expected {}, got {}",
                hex::encode(self.expected),
                hex::encode(actual.as_ref())
            )))
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Certificate verifier that accepts any certificate. Selected only when
/// `reject_unauthorized` is false.
struct TrustAllVerifier {
    provider: Arc<rustls::crypto::CryptoProvider>,
}

impl fmt::Debug for TrustAllVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAllVerifier").finish()
    }
}

impl rustls::client::danger::ServerCertVerifier for TrustAllVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Build the rustls client configuration for this client.
///
/// Priority: fingerprint pinning, then reject_unauthorized=false, then a
/// configured CA bundle, then the built-in webpki roots.
fn build_tls_config(config: &ClientConfig) -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    if let Some(fp) = config.ssl_fingerprint.as_deref() {
        let expected = cert::parse_fingerprint(fp)?;
        let verifier = Arc::new(PinnedVerifier {
            expected,
            provider: provider.clone(),
        });
        return Ok(rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Ssl(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth());
    }

    if !config.reject_unauthorized {
        let verifier = Arc::new(TrustAllVerifier {
            provider: provider.clone(),
        });
        return Ok(rustls::ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Ssl(e.to_string()))?
            .dangerous()
            .with_custom_certificate_verifier(verifier)
            .with_no_client_auth());
    }

    let mut roots = rustls::RootCertStore::empty();
    if let Some(path) = config.ca_bundle.as_deref() {
        for ca in cert::load_certificates(path)? {
            roots
                .add(ca)
                .map_err(|e| Error::Ssl(format!("{}: {}", path.display(), e)))?;
        }
    } else {
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    Ok(rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Ssl(e.to_string()))?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// Classify a failed send. TLS faults anywhere in the cause chain are
/// `Ssl`; everything else is a connection failure.
fn classify_transport(err: &hyper_util::client::legacy::Error, url: &str) -> Error {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(cause) = source {
        if cause.downcast_ref::<rustls::Error>().is_some() {
            return Error::Ssl(format!("{}: {}", url, cause));
        }
        source = cause.source();
    }
    Error::Connection(format!("{}: {}", url, err))
}

/// Pull the issued token id out of the response headers.
fn subject_token(headers: &http::HeaderMap) -> Result<String> {
    headers
        .get("x-subject-token")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::InvalidResponse("token response carried no X-Subject-Token header".to_string())
        })
}

/// Read a response body into text.
async fn read_body_text(body: Incoming) -> Result<String> {
    let collected = body
        .collect()
        .await
        .map_err(|e| Error::Connection(format!("Failed to read response body: {}", e)))?;
    Ok(String::from_utf8_lossy(&collected.to_bytes()).to_string())
}

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// HTTP/2 client for an identity service
///
/// Supports both plaintext HTTP/2 (h2c) and HTTP/2 over TLS. When the auth
/// URL uses `https://`, TLS is used automatically; certificate pinning and
/// custom CA bundles are available through [`ClientConfig`].
///
/// Every detected fault maps to exactly one [`Error`] kind and is returned
/// unchanged to the caller; the client never retries or rewrites errors.
///
/// # Example
/// ```rust,no_run
/// use identity_client::auth::PasswordAuth;
/// use identity_client::{Client, EndpointFilter};
///
/// #[tokio::main]
/// async fn main() -> Result<(), identity_client::Error> {
///     let client = Client::new("http://localhost:5000")?
///         .with_plugin(Box::new(PasswordAuth::new("alice", "hunter2")));
///
///     let token = client.authenticate().await?;
///     let url = client.endpoint_for(&token, &EndpointFilter::new("object-store"))?;
///     println!("object store lives at {}", url);
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    config: Arc<ClientConfig>,
    http_client: HttpClient<HttpsConnector, Full<Bytes>>,
    plugin: Option<Arc<dyn AuthPlugin>>,
}

impl Client {
    /// Create a client for the identity server at `auth_url`.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the URL does not parse.
    pub fn new(auth_url: &str) -> Result<Self> {
        let config = ClientConfig {
            auth_url: auth_url.to_string(),
            ..Default::default()
        };
        Self::with_config(config)
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut config = config;
        config.auth_url = config.auth_url.trim_end_matches('/').to_string();

        // Validate the auth URL early
        let _: Uri = config.auth_url.parse().map_err(|e| {
            Error::Validation(format!("Invalid auth URL {:?}: {}", config.auth_url, e))
        })?;

        if config.ssl_fingerprint.is_some() && !config.auth_url.starts_with("https://") {
            return Err(Error::Ssl(
                "ssl_fingerprint requires an https:// auth URL".to_string(),
            ));
        }

        let tls_config = build_tls_config(&config)?;

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http2()
            .build();

        let http_client = HttpClient::builder(TokioExecutor::new())
            .http2_only(true)
            .build(https_connector);

        Ok(Self {
            config: Arc::new(config),
            http_client,
            plugin: None,
        })
    }

    /// Attach the auth plugin used by [`Client::authenticate`].
    pub fn with_plugin(mut self, plugin: Box<dyn AuthPlugin>) -> Self {
        self.plugin = Some(Arc::from(plugin));
        self
    }

    /// The configured identity server root URL.
    pub fn auth_url(&self) -> &str {
        &self.config.auth_url
    }

    /// Send a request, classifying transport faults only. The response is
    /// handed back whatever its status.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: &[(&str, String)],
    ) -> Result<Response<Incoming>> {
        let uri: Uri = url
            .parse()
            .map_err(|e| Error::Validation(format!("Invalid request URL {:?}: {}", url, e)))?;

        debug!(method = %method, url, "sending request");

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("accept", "application/json");
        for (name, value) in headers {
            builder = builder.header(*name, value.as_str());
        }
        let req = builder
            .body(Full::new(body.unwrap_or_else(Bytes::new)))
            .map_err(|e| Error::Validation(format!("Failed to build request: {}", e)))?;

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let response = tokio::time::timeout(timeout, self.http_client.request(req))
            .await
            // The request timeout is reported as the connect timeout kind;
            // callers have always matched on that.
            .map_err(|_| {
                Error::ConnectTimeout(format!("{} after {}ms", url, self.config.timeout_ms))
            })?
            .map_err(|e| classify_transport(&e, url))?;

        Ok(response)
    }

    /// Send a request and classify any status of 300 or above through the
    /// taxonomy's status lookup.
    async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: &[(&str, String)],
    ) -> Result<Response<Incoming>> {
        let response = self.send(method, url, body, headers).await?;
        let status = response.status().as_u16();
        if status >= 300 {
            let body_text = read_body_text(response.into_body()).await?;
            return Err(Error::from_response(status, Some(&body_text)));
        }
        Ok(response)
    }

    /// Fetch the server's version discovery document.
    ///
    /// The identity root answers 300 Multiple Choices with the document as
    /// its body, so 300 is treated as success here and only here.
    pub async fn versions(&self) -> Result<VersionDoc> {
        let url = format!("{}/", self.config.auth_url);
        let response = self.send(Method::GET, &url, None, &[]).await?;
        let status = response.status().as_u16();
        if status <= 300 {
            let body = read_body_text(response.into_body()).await?;
            VersionDoc::from_json(&body)
        } else {
            let body = read_body_text(response.into_body()).await?;
            Err(Error::from_response(status, Some(&body)))
        }
    }

    /// Discover and negotiate the API version to use.
    pub async fn negotiate_version(&self, requested: Option<&str>) -> Result<Version> {
        let doc = self.versions().await?;
        doc.best_match(requested).map(Clone::clone)
    }

    /// Request a token using the configured auth plugin.
    ///
    /// # Errors
    /// [`Error::MissingAuthPlugin`] when no plugin is attached; otherwise
    /// whatever kind the transport or response classifies to.
    pub async fn authenticate(&self) -> Result<Token> {
        let plugin = self.plugin.as_ref().ok_or(Error::MissingAuthPlugin)?;
        let body = serde_json::to_vec(&plugin.payload())
            .map_err(|e| Error::Validation(format!("Cannot serialize auth payload: {}", e)))?;

        let url = format!("{}/v3/auth/tokens", self.config.auth_url);
        let response = self
            .request(
                Method::POST,
                &url,
                Some(Bytes::from(body)),
                &[("content-type", "application/json".to_string())],
            )
            .await?;

        let token_id = subject_token(response.headers())?;

        let body = read_body_text(response.into_body()).await?;
        let envelope: TokenEnvelope = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("token document did not parse: {}", e)))?;

        debug!(plugin = plugin.name(), "authenticated");
        Ok(Token {
            id: token_id,
            expires_at: envelope.token.expires_at,
            catalog: envelope.token.catalog,
        })
    }

    /// Validate another token, returning its resolved form.
    pub async fn validate_token(&self, token: &Token, subject_id: &str) -> Result<Token> {
        let url = format!("{}/v3/auth/tokens", self.config.auth_url);
        let headers = [
            ("x-auth-token", token.id.clone()),
            ("x-subject-token", subject_id.to_string()),
        ];
        let response = self.request(Method::GET, &url, None, &headers).await?;
        let body = read_body_text(response.into_body()).await?;
        let envelope: TokenEnvelope = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("token document did not parse: {}", e)))?;
        Ok(Token {
            id: subject_id.to_string(),
            expires_at: envelope.token.expires_at,
            catalog: envelope.token.catalog,
        })
    }

    /// Fetch one user record by id.
    pub async fn get_user(&self, token: &Token, user_id: &str) -> Result<User> {
        let url = format!(
            "{}/v3/users/{}",
            self.config.auth_url,
            encode_segment(user_id)
        );
        let response = self
            .request(
                Method::GET,
                &url,
                None,
                &[("x-auth-token", token.id.clone())],
            )
            .await?;
        let body = read_body_text(response.into_body()).await?;
        let envelope: UserEnvelope = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("user document did not parse: {}", e)))?;
        Ok(envelope.user)
    }

    /// Resolve the one endpoint URL the token's catalog offers for a filter.
    pub fn endpoint_for(&self, token: &Token, filter: &EndpointFilter) -> Result<Url> {
        token.catalog.url_for(filter)
    }
}
