//! Error types for the identity client
//!
//! One [`Error`] value classifies exactly one detected fault. Callers branch
//! on the variant (or on [`Error::category`]) to decide retry, fallback or
//! user messaging. The taxonomy itself never raises anything: it only defines
//! value shapes plus the total status-code lookup in
//! [`HttpError::from_response`].

use thiserror::Error;

use crate::types::Endpoint;

/// Errors that can occur when interacting with an identity service
#[derive(Error, Debug)]
pub enum Error {
    /// Unable to reach the server at all (refused, reset, DNS, ...)
    #[error("Unable to establish connection: {0}")]
    Connection(String),

    /// TLS handshake or certificate verification failed
    #[error("SSL exception connecting to server: {0}")]
    Ssl(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    ConnectTimeout(String),

    /// The server answered with a failure status code
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Error in validation on the API client side
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested API version is not supported by this client
    #[error("Unsupported API version: {0}")]
    UnsupportedVersion(String),

    /// Error in a CLI tool built on this client
    #[error("Command error: {0}")]
    Command(String),

    /// Method not implemented by the client for the negotiated API
    #[error("Method not implemented: {0}")]
    MethodNotImplemented(String),

    /// The client could not be authorized
    #[error("Cannot authorize API client: {0}")]
    AuthorizationFailure(String),

    /// An auth plugin was selected but some of its options were not given
    #[error("Authentication failed. Missing options: {}", .opt_names.join(", "))]
    AuthPluginOptionsMissing {
        /// The missing option names, in the plugin's declared order.
        opt_names: Vec<String>,
    },

    /// Configuration named an auth system that is not installed
    #[error("AuthSystemNotFound: {auth_system:?}")]
    AuthSystemNotFound {
        /// The unrecognized system name, exactly as configured.
        auth_system: String,
    },

    /// Certificate material could not be read or parsed
    #[error("Unable to load certificate")]
    CertificateConfig {
        /// Raw loader/parser output for diagnostics.
        output: String,
    },

    /// A CMS-signed payload could not be handled
    #[error("Unable to sign or verify data")]
    Cms {
        /// Raw output describing the offending payload.
        output: String,
    },

    /// Generic service catalog failure
    #[error("Service catalog error: {0}")]
    Catalog(String),

    /// The service catalog contains no services at all
    #[error("The service catalog is empty.")]
    EmptyCatalog,

    /// No endpoint in the catalog satisfied the lookup
    #[error("Could not find requested endpoint in Service Catalog.")]
    EndpointNotFound,

    /// More than one endpoint satisfied the lookup
    #[error("AmbiguousEndpoints: {endpoints:?}")]
    AmbiguousEndpoints {
        /// Surviving candidates in catalog order. Empty when the caller did
        /// not record them.
        endpoints: Vec<Endpoint>,
    },

    /// More than one service satisfied the lookup
    #[error("Multiple entities found instead of one.")]
    NoUniqueMatch,

    /// Version discovery could not complete
    #[error("Discovery failure: {0}")]
    Discovery(String),

    /// Discovery completed but the requested version is not offered
    #[error("Requested API version is not available: {0}")]
    VersionNotAvailable(String),

    /// An operation needed an auth plugin and none was configured
    #[error("An auth plugin is required to determine endpoint URL")]
    MissingAuthPlugin,

    /// A plugin was requested by name and no loader provides it
    #[error("The plugin {name} could not be found")]
    NoMatchingPlugin {
        /// The requested plugin name.
        name: String,
    },

    /// The server's response could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

// Historical names kept for callers written against the old surface.
// "Timeout" and "RequestTimeout" intentionally name the connect timeout,
// not HTTP 408. "ConnectionRefused" is the general connection kind.
pub use self::Error::{
    ConnectTimeout as RequestTimeout, ConnectTimeout as Timeout, Connection as ConnectionRefused,
};

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level classification of an [`Error`]. Every variant belongs to
/// exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Socket, TLS and timeout failures below HTTP.
    Transport,
    /// Failures carried by or concerning the HTTP response itself.
    Http,
    /// Client-side validation and usage mistakes.
    Usage,
    /// Authorization and auth-plugin configuration failures.
    Authorization,
    /// Certificate and signed-payload failures.
    Certificate,
    /// Service catalog and version discovery failures.
    Catalog,
}

impl Error {
    /// Classify a raw HTTP response into the matching [`Error::Http`] kind.
    ///
    /// Total over the whole status range; see [`HttpError::from_response`].
    pub fn from_response(status: u16, body: Option<&str>) -> Self {
        Error::Http(HttpError::from_response(status, body))
    }

    /// The category this kind belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Connection(_) | Error::Ssl(_) | Error::ConnectTimeout(_) => {
                ErrorCategory::Transport
            }
            Error::Http(_) | Error::InvalidResponse(_) => ErrorCategory::Http,
            Error::Validation(_)
            | Error::UnsupportedVersion(_)
            | Error::Command(_)
            | Error::MethodNotImplemented(_) => ErrorCategory::Usage,
            Error::AuthorizationFailure(_)
            | Error::AuthPluginOptionsMissing { .. }
            | Error::AuthSystemNotFound { .. }
            | Error::MissingAuthPlugin
            | Error::NoMatchingPlugin { .. } => ErrorCategory::Authorization,
            Error::CertificateConfig { .. } | Error::Cms { .. } => ErrorCategory::Certificate,
            Error::Catalog(_)
            | Error::EmptyCatalog
            | Error::EndpointNotFound
            | Error::AmbiguousEndpoints { .. }
            | Error::NoUniqueMatch
            | Error::Discovery(_)
            | Error::VersionNotAvailable(_) => ErrorCategory::Catalog,
        }
    }

    /// The HTTP status code carried by this error, if it carries one.
    ///
    /// Transport kinds have no status code; neither does
    /// [`Error::InvalidResponse`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http(http) => Some(http.status),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Connection failures, timeouts and 503 qualify. Retrying is the
    /// caller's job; this client never retries on its own.
    pub fn is_retriable(&self) -> bool {
        match self {
            Error::Connection(_) | Error::ConnectTimeout(_) => true,
            Error::Http(http) => http.status == 503,
            _ => false,
        }
    }
}

/// An HTTP response failure: the leaf kind, the status code as received,
/// and a human-readable message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (HTTP {status})")]
pub struct HttpError {
    /// The leaf kind the status code mapped to.
    pub kind: HttpKind,
    /// The status code exactly as received.
    pub status: u16,
    /// Message from the response body, or the kind's stock message.
    pub message: String,
    /// The raw response body, verbatim, when one was received.
    pub details: Option<String>,
}

impl HttpError {
    /// Classify a raw status code and optional response body.
    ///
    /// Total over the input domain: codes in the fixed table map to their
    /// leaf kind, other codes fall into the generic bucket for their
    /// hundreds digit, and the received code is always kept in `status`.
    /// JSON bodies of the form `{"error": {"message": ...}}` contribute
    /// their message; any other non-empty body is used as the message
    /// verbatim.
    pub fn from_response(status: u16, body: Option<&str>) -> Self {
        let kind = HttpKind::from_status(status);
        let raw = body.map(str::trim).filter(|b| !b.is_empty());
        let message = raw
            .and_then(message_from_body)
            .or_else(|| raw.map(str::to_string))
            .unwrap_or_else(|| kind.default_message().to_string());
        HttpError {
            kind,
            status,
            message,
            details: raw.map(str::to_string),
        }
    }

    /// The canonical form of a kind: its bound status code, its stock
    /// message and no response payload.
    pub fn from_kind(kind: HttpKind) -> Self {
        HttpError {
            kind,
            status: kind.default_status(),
            message: kind.default_message().to_string(),
            details: None,
        }
    }

    /// True for 3xx responses.
    pub fn is_redirection(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// True for 4xx responses.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// True for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Pull the message out of an `{"error": {"message": ...}}` body.
fn message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Leaf kinds of [`HttpError`].
///
/// Named kinds bind one fixed status code each. The four generic kinds
/// (`Redirection`, `ClientError`, `ServerError`, `Other`) catch everything
/// the table does not name, bucketed by status class, so that
/// [`HttpKind::from_status`] is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpKind {
    /// 300 Multiple Choices
    MultipleChoices,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 402 Payment Required
    PaymentRequired,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 406 Not Acceptable
    NotAcceptable,
    /// 407 Proxy Authentication Required
    ProxyAuthenticationRequired,
    /// 409 Conflict
    Conflict,
    /// 410 Gone
    Gone,
    /// 411 Length Required
    LengthRequired,
    /// 412 Precondition Failed
    PreconditionFailed,
    /// 413 Request Entity Too Large
    RequestEntityTooLarge,
    /// 414 Request-URI Too Long
    RequestUriTooLong,
    /// 415 Unsupported Media Type
    UnsupportedMediaType,
    /// 416 Requested Range Not Satisfiable
    RequestedRangeNotSatisfiable,
    /// 417 Expectation Failed
    ExpectationFailed,
    /// 422 Unprocessable Entity
    UnprocessableEntity,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
    /// 502 Bad Gateway
    BadGateway,
    /// 503 Service Unavailable
    ServiceUnavailable,
    /// 504 Gateway Timeout
    GatewayTimeout,
    /// 505 HTTP Version Not Supported
    HttpVersionNotSupported,
    /// Any other 3xx
    Redirection,
    /// Any other 4xx
    ClientError,
    /// Any other 5xx
    ServerError,
    /// Anything outside 300-599
    Other,
}

impl HttpKind {
    /// Map a status code to its leaf kind. Total over `u16`.
    pub fn from_status(status: u16) -> Self {
        match status {
            300 => HttpKind::MultipleChoices,
            400 => HttpKind::BadRequest,
            401 => HttpKind::Unauthorized,
            402 => HttpKind::PaymentRequired,
            403 => HttpKind::Forbidden,
            404 => HttpKind::NotFound,
            405 => HttpKind::MethodNotAllowed,
            406 => HttpKind::NotAcceptable,
            407 => HttpKind::ProxyAuthenticationRequired,
            409 => HttpKind::Conflict,
            410 => HttpKind::Gone,
            411 => HttpKind::LengthRequired,
            412 => HttpKind::PreconditionFailed,
            413 => HttpKind::RequestEntityTooLarge,
            414 => HttpKind::RequestUriTooLong,
            415 => HttpKind::UnsupportedMediaType,
            416 => HttpKind::RequestedRangeNotSatisfiable,
            417 => HttpKind::ExpectationFailed,
            422 => HttpKind::UnprocessableEntity,
            500 => HttpKind::InternalServerError,
            501 => HttpKind::NotImplemented,
            502 => HttpKind::BadGateway,
            503 => HttpKind::ServiceUnavailable,
            504 => HttpKind::GatewayTimeout,
            505 => HttpKind::HttpVersionNotSupported,
            301..=399 => HttpKind::Redirection,
            408 | 418..=499 => HttpKind::ClientError,
            506..=599 => HttpKind::ServerError,
            _ => HttpKind::Other,
        }
    }

    /// The status code bound to this kind.
    ///
    /// Generic kinds report their class code (300, 400, 500); `Other`
    /// reports 500, matching what legacy callers always saw.
    pub fn default_status(self) -> u16 {
        match self {
            HttpKind::MultipleChoices => 300,
            HttpKind::BadRequest => 400,
            HttpKind::Unauthorized => 401,
            HttpKind::PaymentRequired => 402,
            HttpKind::Forbidden => 403,
            HttpKind::NotFound => 404,
            HttpKind::MethodNotAllowed => 405,
            HttpKind::NotAcceptable => 406,
            HttpKind::ProxyAuthenticationRequired => 407,
            HttpKind::Conflict => 409,
            HttpKind::Gone => 410,
            HttpKind::LengthRequired => 411,
            HttpKind::PreconditionFailed => 412,
            HttpKind::RequestEntityTooLarge => 413,
            HttpKind::RequestUriTooLong => 414,
            HttpKind::UnsupportedMediaType => 415,
            HttpKind::RequestedRangeNotSatisfiable => 416,
            HttpKind::ExpectationFailed => 417,
            HttpKind::UnprocessableEntity => 422,
            HttpKind::InternalServerError => 500,
            HttpKind::NotImplemented => 501,
            HttpKind::BadGateway => 502,
            HttpKind::ServiceUnavailable => 503,
            HttpKind::GatewayTimeout => 504,
            HttpKind::HttpVersionNotSupported => 505,
            HttpKind::Redirection => 300,
            HttpKind::ClientError => 400,
            HttpKind::ServerError | HttpKind::Other => 500,
        }
    }

    /// The stock human-readable message for this kind.
    pub fn default_message(self) -> &'static str {
        match self {
            HttpKind::MultipleChoices => "Multiple Choices",
            HttpKind::BadRequest => "Bad Request",
            HttpKind::Unauthorized => "Unauthorized",
            HttpKind::PaymentRequired => "Payment Required",
            HttpKind::Forbidden => "Forbidden",
            HttpKind::NotFound => "Not Found",
            HttpKind::MethodNotAllowed => "Method Not Allowed",
            HttpKind::NotAcceptable => "Not Acceptable",
            HttpKind::ProxyAuthenticationRequired => "Proxy Authentication Required",
            HttpKind::Conflict => "Conflict",
            HttpKind::Gone => "Gone",
            HttpKind::LengthRequired => "Length Required",
            HttpKind::PreconditionFailed => "Precondition Failed",
            HttpKind::RequestEntityTooLarge => "Request Entity Too Large",
            HttpKind::RequestUriTooLong => "Request-URI Too Long",
            HttpKind::UnsupportedMediaType => "Unsupported Media Type",
            HttpKind::RequestedRangeNotSatisfiable => "Requested Range Not Satisfiable",
            HttpKind::ExpectationFailed => "Expectation Failed",
            HttpKind::UnprocessableEntity => "Unprocessable Entity",
            HttpKind::InternalServerError => "Internal Server Error",
            HttpKind::NotImplemented => "Not Implemented",
            HttpKind::BadGateway => "Bad Gateway",
            HttpKind::ServiceUnavailable => "Service Unavailable",
            HttpKind::GatewayTimeout => "Gateway Timeout",
            HttpKind::HttpVersionNotSupported => "HTTP Version Not Supported",
            HttpKind::Redirection => "HTTP Redirection",
            HttpKind::ClientError => "HTTP Client Error",
            HttpKind::ServerError => "HTTP Server Error",
            HttpKind::Other => "HTTP Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMED_KINDS: &[(u16, HttpKind)] = &[
        (300, HttpKind::MultipleChoices),
        (400, HttpKind::BadRequest),
        (401, HttpKind::Unauthorized),
        (402, HttpKind::PaymentRequired),
        (403, HttpKind::Forbidden),
        (404, HttpKind::NotFound),
        (405, HttpKind::MethodNotAllowed),
        (406, HttpKind::NotAcceptable),
        (407, HttpKind::ProxyAuthenticationRequired),
        (409, HttpKind::Conflict),
        (410, HttpKind::Gone),
        (411, HttpKind::LengthRequired),
        (412, HttpKind::PreconditionFailed),
        (413, HttpKind::RequestEntityTooLarge),
        (414, HttpKind::RequestUriTooLong),
        (415, HttpKind::UnsupportedMediaType),
        (416, HttpKind::RequestedRangeNotSatisfiable),
        (417, HttpKind::ExpectationFailed),
        (422, HttpKind::UnprocessableEntity),
        (500, HttpKind::InternalServerError),
        (501, HttpKind::NotImplemented),
        (502, HttpKind::BadGateway),
        (503, HttpKind::ServiceUnavailable),
        (504, HttpKind::GatewayTimeout),
        (505, HttpKind::HttpVersionNotSupported),
    ];

    #[test]
    fn test_status_table_matches_named_kinds() {
        for (status, kind) in NAMED_KINDS {
            assert_eq!(HttpKind::from_status(*status), *kind);
            assert_eq!(kind.default_status(), *status);
        }
    }

    #[test]
    fn test_lookup_is_total_and_preserves_status() {
        for status in 100..=599u16 {
            let err = HttpError::from_response(status, None);
            assert_eq!(err.status, status, "lookup must keep the input status");
            assert!(!err.message.is_empty());
        }
    }

    #[test]
    fn test_not_found_defaults() {
        let err = HttpError::from_response(404, None);
        assert_eq!(err.kind, HttpKind::NotFound);
        assert_eq!(err.message, "Not Found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_multiple_choices_is_a_redirection() {
        let err = HttpError::from_response(300, None);
        assert_eq!(err.kind, HttpKind::MultipleChoices);
        assert!(err.is_redirection());
    }

    #[test]
    fn test_unlisted_codes_fall_into_generic_buckets() {
        let teapot = HttpError::from_response(418, None);
        assert_eq!(teapot.kind, HttpKind::ClientError);
        assert_eq!(teapot.status, 418);
        assert!(teapot.is_client_error());

        let bandwidth = HttpError::from_response(509, None);
        assert_eq!(bandwidth.kind, HttpKind::ServerError);
        assert_eq!(bandwidth.status, 509);

        let redirect = HttpError::from_response(307, None);
        assert_eq!(redirect.kind, HttpKind::Redirection);

        let odd = HttpError::from_response(200, None);
        assert_eq!(odd.kind, HttpKind::Other);
        assert_eq!(odd.status, 200);
    }

    #[test]
    fn test_408_is_not_a_named_timeout_kind() {
        // The timeout names are bound to the connect timeout; 408 stays in
        // the generic client-error bucket.
        let err = HttpError::from_response(408, None);
        assert_eq!(err.kind, HttpKind::ClientError);
        assert_eq!(err.status, 408);
    }

    #[test]
    fn test_json_error_body_contributes_message() {
        let body = r#"{"error": {"code": 401, "message": "The request you have made requires authentication.", "title": "Unauthorized"}}"#;
        let err = HttpError::from_response(401, Some(body));
        assert_eq!(err.kind, HttpKind::Unauthorized);
        assert_eq!(
            err.message,
            "The request you have made requires authentication."
        );
        assert_eq!(err.details.as_deref(), Some(body));
    }

    #[test]
    fn test_plain_body_used_verbatim() {
        let err = HttpError::from_response(502, Some("upstream exploded\n"));
        assert_eq!(err.kind, HttpKind::BadGateway);
        assert_eq!(err.message, "upstream exploded");
    }

    #[test]
    fn test_blank_body_falls_back_to_default_message() {
        let err = HttpError::from_response(403, Some("   "));
        assert_eq!(err.message, "Forbidden");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_from_kind_is_canonical() {
        let err = HttpError::from_kind(HttpKind::ServiceUnavailable);
        assert_eq!(err.status, 503);
        assert_eq!(err.message, "Service Unavailable");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_default_messages_are_non_empty() {
        for (_, kind) in NAMED_KINDS {
            assert!(!kind.default_message().is_empty());
        }
        for kind in [
            HttpKind::Redirection,
            HttpKind::ClientError,
            HttpKind::ServerError,
            HttpKind::Other,
        ] {
            assert!(!kind.default_message().is_empty());
        }
    }

    #[test]
    fn test_timeout_aliases_are_the_connect_timeout() {
        let err = Timeout("service timed out".to_string());
        assert!(matches!(err, Error::ConnectTimeout(_)));
        match err {
            RequestTimeout(msg) => assert_eq!(msg, "service timed out"),
            other => panic!("expected the connect timeout kind, got: {:?}", other),
        }
        assert!(Timeout(String::new()).status_code().is_none());
    }

    #[test]
    fn test_connection_refused_alias_is_the_connection_kind() {
        let err = ConnectionRefused("refused".to_string());
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn test_auth_plugin_options_missing_message_order() {
        let err = Error::AuthPluginOptionsMissing {
            opt_names: vec!["username".to_string(), "password".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Authentication failed. Missing options: username, password"
        );
        // Payload stays readable without parsing the message.
        match err {
            Error::AuthPluginOptionsMissing { opt_names } => {
                assert_eq!(opt_names, ["username", "password"]);
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_endpoints_with_and_without_candidates() {
        let named = Error::AmbiguousEndpoints {
            endpoints: vec![
                Endpoint::new("public", "http://ep1.example.com"),
                Endpoint::new("public", "http://ep2.example.com"),
            ],
        };
        match &named {
            Error::AmbiguousEndpoints { endpoints } => assert_eq!(endpoints.len(), 2),
            other => panic!("unexpected kind: {:?}", other),
        }
        assert!(named.to_string().contains("ep1.example.com"));

        let bare = Error::AmbiguousEndpoints { endpoints: vec![] };
        match bare {
            Error::AmbiguousEndpoints { endpoints } => assert!(endpoints.is_empty()),
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_every_kind_has_exactly_one_category() {
        use ErrorCategory::*;
        let cases: Vec<(Error, ErrorCategory)> = vec![
            (Error::Connection("x".into()), Transport),
            (Error::Ssl("x".into()), Transport),
            (Error::ConnectTimeout("x".into()), Transport),
            (Error::from_response(404, None), Http),
            (Error::InvalidResponse("x".into()), Http),
            (Error::Validation("x".into()), Usage),
            (Error::UnsupportedVersion("x".into()), Usage),
            (Error::Command("x".into()), Usage),
            (Error::MethodNotImplemented("x".into()), Usage),
            (Error::AuthorizationFailure("x".into()), Authorization),
            (
                Error::AuthPluginOptionsMissing { opt_names: vec![] },
                Authorization,
            ),
            (
                Error::AuthSystemNotFound {
                    auth_system: "x".into(),
                },
                Authorization,
            ),
            (Error::MissingAuthPlugin, Authorization),
            (Error::NoMatchingPlugin { name: "x".into() }, Authorization),
            (Error::CertificateConfig { output: "x".into() }, Certificate),
            (Error::Cms { output: "x".into() }, Certificate),
            (Error::Catalog("x".into()), Catalog),
            (Error::EmptyCatalog, Catalog),
            (Error::EndpointNotFound, Catalog),
            (Error::AmbiguousEndpoints { endpoints: vec![] }, Catalog),
            (Error::NoUniqueMatch, Catalog),
            (Error::Discovery("x".into()), Catalog),
            (Error::VersionNotAvailable("v3".into()), Catalog),
        ];
        for (err, expected) in cases {
            assert_eq!(err.category(), expected, "category of {:?}", err);
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_status_code_exposed_only_for_http_kinds() {
        assert_eq!(Error::from_response(503, None).status_code(), Some(503));
        assert_eq!(Error::EmptyCatalog.status_code(), None);
        assert_eq!(Error::Connection("x".into()).status_code(), None);
    }

    #[test]
    fn test_retriable_classification() {
        assert!(Error::Connection("reset".into()).is_retriable());
        assert!(Timeout("t".into()).is_retriable());
        assert!(Error::from_response(503, None).is_retriable());
        assert!(!Error::from_response(500, None).is_retriable());
        assert!(!Error::Validation("bad".into()).is_retriable());
    }
}
