//! Basic usage example for the identity client
//!
//! Run with: cargo run --example basic_usage

use identity_client::auth::PasswordAuth;
use identity_client::{Client, EndpointFilter, Error};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    // Credentials from the environment
    let auth_url =
        std::env::var("IDENTITY_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let username = std::env::var("IDENTITY_USER").unwrap_or_else(|_| "demo".to_string());
    let password = std::env::var("IDENTITY_PASSWORD").unwrap_or_else(|_| "demo".to_string());

    // Create client
    let client = Client::new(&auth_url)?
        .with_plugin(Box::new(PasswordAuth::new(&username, &password)));

    // Discover what the server offers
    info!("Discovering API versions at {}...", auth_url);
    let version = client.negotiate_version(Some("v3")).await?;
    info!("Negotiated version: {} ({})", version.id, version.status);

    // Request a token
    info!("Authenticating as {}...", username);
    let token = match client.authenticate().await {
        Ok(token) => token,
        Err(err) if err.is_retriable() => {
            warn!("Transient failure, a retry might work: {}", err);
            return Err(err.into());
        }
        Err(err) => {
            warn!("Authentication failed ({:?}): {}", err.category(), err);
            return Err(err.into());
        }
    };
    info!("Token issued, expires at {:?}", token.expires_at);

    // Find a service endpoint in the returned catalog
    let filter = EndpointFilter::new("object-store");
    match client.endpoint_for(&token, &filter) {
        Ok(url) => info!("Object store endpoint: {}", url),
        Err(Error::EmptyCatalog) => warn!("The token came with an empty catalog"),
        Err(Error::AmbiguousEndpoints { endpoints }) => {
            warn!("More than one object store endpoint:");
            for endpoint in endpoints {
                warn!("  - {} ({})", endpoint.url, endpoint.interface);
            }
        }
        Err(err) => return Err(err.into()),
    }

    info!("Example completed successfully!");
    Ok(())
}
