//! Client tests against a local scripted HTTP/2 server.
//!
//! Each test spins up a plaintext h2 server on a loopback port and checks
//! that the client maps what the server does onto the right error kind.

use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http2;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpListener;

use identity_client::auth::PasswordAuth;
use identity_client::error::Timeout;
use identity_client::{Client, ClientConfig, EndpointFilter, Error, HttpKind, ServiceCatalog, Token};

type Handler = fn(Request<Incoming>) -> Response<Full<Bytes>>;

async fn spawn_server(handler: Handler) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            tokio::spawn(async move {
                let service =
                    service_fn(move |req| async move { Ok::<_, Infallible>(handler(req)) });
                let _ = http2::Builder::new(TokioExecutor::new())
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });
    addr
}

fn respond(status: u16, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::from_u16(status).unwrap())
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

fn client_for(addr: SocketAddr) -> Client {
    Client::new(&format!("http://{}", addr)).unwrap()
}

fn password_client(addr: SocketAddr) -> Client {
    client_for(addr).with_plugin(Box::new(PasswordAuth::new("alice", "hunter2")))
}

fn stub_token() -> Token {
    Token {
        id: "tok-abc".to_string(),
        expires_at: None,
        catalog: ServiceCatalog::default(),
    }
}

const TOKEN_BODY: &str = r#"{
    "token": {
        "expires_at": "2030-01-01T00:00:00Z",
        "catalog": [
            {
                "type": "object-store",
                "name": "swift",
                "endpoints": [
                    {"interface": "public", "region": "north", "url": "https://store.example.com/v1"}
                ]
            }
        ]
    }
}"#;

const VERSIONS_BODY: &str = r#"{
    "versions": {
        "values": [
            {"id": "v3.14", "status": "stable",
             "links": [{"rel": "self", "href": "http://localhost/v3/"}]}
        ]
    }
}"#;

#[tokio::test]
async fn unauthorized_maps_to_the_401_kind() {
    fn deny(_req: Request<Incoming>) -> Response<Full<Bytes>> {
        respond(
            401,
            r#"{"error": {"code": 401, "message": "The request you have made requires authentication.", "title": "Unauthorized"}}"#,
        )
    }
    let addr = spawn_server(deny).await;
    let err = password_client(addr).authenticate().await.unwrap_err();
    match err {
        Error::Http(http) => {
            assert_eq!(http.kind, HttpKind::Unauthorized);
            assert_eq!(http.status, 401);
            assert_eq!(
                http.message,
                "The request you have made requires authentication."
            );
            assert!(http.details.is_some());
        }
        other => panic!("expected an HTTP kind, got: {:?}", other),
    }
}

#[tokio::test]
async fn not_found_maps_to_the_404_kind() {
    fn missing(_req: Request<Incoming>) -> Response<Full<Bytes>> {
        respond(404, r#"{"error": {"code": 404, "message": "Could not find user"}}"#)
    }
    let addr = spawn_server(missing).await;
    let err = client_for(addr)
        .get_user(&stub_token(), "ghost")
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
    match err {
        Error::Http(http) => {
            assert_eq!(http.kind, HttpKind::NotFound);
            assert_eq!(http.message, "Could not find user");
        }
        other => panic!("expected an HTTP kind, got: {:?}", other),
    }
}

#[tokio::test]
async fn service_unavailable_is_retriable() {
    fn unavailable(_req: Request<Incoming>) -> Response<Full<Bytes>> {
        respond(503, "catalog backend is down")
    }
    let addr = spawn_server(unavailable).await;
    let err = password_client(addr).authenticate().await.unwrap_err();
    assert!(err.is_retriable());
    match err {
        Error::Http(http) => {
            assert_eq!(http.kind, HttpKind::ServiceUnavailable);
            assert_eq!(http.message, "catalog backend is down");
        }
        other => panic!("expected an HTTP kind, got: {:?}", other),
    }
}

#[tokio::test]
async fn versions_accepts_the_300_root_response() {
    fn root(req: Request<Incoming>) -> Response<Full<Bytes>> {
        assert_eq!(req.uri().path(), "/");
        respond(300, VERSIONS_BODY)
    }
    let addr = spawn_server(root).await;
    let client = client_for(addr);

    let doc = client.versions().await.unwrap();
    assert_eq!(doc.versions().len(), 1);

    let version = client.negotiate_version(Some("v3")).await.unwrap();
    assert_eq!(version.id, "v3.14");

    let err = client.negotiate_version(Some("v4")).await.unwrap_err();
    assert!(matches!(err, Error::VersionNotAvailable(_)));
}

#[tokio::test]
async fn authenticate_returns_token_and_catalog() {
    fn issue(req: Request<Incoming>) -> Response<Full<Bytes>> {
        assert_eq!(req.uri().path(), "/v3/auth/tokens");
        assert_eq!(req.method(), &hyper::Method::POST);
        let mut response = respond(201, TOKEN_BODY);
        response
            .headers_mut()
            .insert("x-subject-token", "tok-12345".parse().unwrap());
        response
    }
    let addr = spawn_server(issue).await;
    let client = password_client(addr);

    let token = client.authenticate().await.unwrap();
    assert_eq!(token.id, "tok-12345");
    assert_eq!(token.expires_at.as_deref(), Some("2030-01-01T00:00:00Z"));

    let url = client
        .endpoint_for(&token, &EndpointFilter::new("object-store"))
        .unwrap();
    assert_eq!(url.as_str(), "https://store.example.com/v1");

    let err = client
        .endpoint_for(&token, &EndpointFilter::new("compute"))
        .unwrap_err();
    assert!(matches!(err, Error::EndpointNotFound));
}

#[tokio::test]
async fn missing_subject_token_header_is_an_invalid_response() {
    fn issue_headerless(_req: Request<Incoming>) -> Response<Full<Bytes>> {
        respond(201, TOKEN_BODY)
    }
    let addr = spawn_server(issue_headerless).await;
    let err = password_client(addr).authenticate().await.unwrap_err();
    match err {
        Error::InvalidResponse(msg) => assert!(msg.contains("X-Subject-Token")),
        other => panic!("expected InvalidResponse, got: {:?}", other),
    }
}

#[tokio::test]
async fn malformed_token_document_is_an_invalid_response() {
    fn issue_garbage(_req: Request<Incoming>) -> Response<Full<Bytes>> {
        let mut response = respond(201, "{not json");
        response
            .headers_mut()
            .insert("x-subject-token", "tok-12345".parse().unwrap());
        response
    }
    let addr = spawn_server(issue_garbage).await;
    let err = password_client(addr).authenticate().await.unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
}

#[tokio::test]
async fn get_user_percent_encodes_the_id() {
    fn user(req: Request<Incoming>) -> Response<Full<Bytes>> {
        assert_eq!(req.uri().path(), "/v3/users/user%20one");
        respond(
            200,
            r#"{"user": {"id": "user one", "name": "User One", "enabled": true}}"#,
        )
    }
    let addr = spawn_server(user).await;
    let fetched = client_for(addr)
        .get_user(&stub_token(), "user one")
        .await
        .unwrap();
    assert_eq!(fetched.name, "User One");
    assert!(fetched.enabled);
}

#[tokio::test]
async fn request_timeout_is_the_connect_timeout_kind() {
    // Bound but never accepted: the TCP handshake completes into the
    // backlog and the h2 preface never gets an answer.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let client = Client::with_config(ClientConfig {
        auth_url: format!("http://{}", addr),
        timeout_ms: 200,
        ..Default::default()
    })
    .unwrap();

    let err = client.versions().await.unwrap_err();
    match err {
        // Matching through the historical alias: same kind as ConnectTimeout.
        Timeout(msg) => assert!(msg.contains("200ms"), "message: {}", msg),
        other => panic!("expected the connect timeout kind, got: {:?}", other),
    }
    drop(listener);
}

#[tokio::test]
async fn refused_connection_is_the_connection_kind() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr).versions().await.unwrap_err();
    assert!(matches!(err, Error::Connection(_)), "got: {:?}", err);
    assert!(err.is_retriable());
}
