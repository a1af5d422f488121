//! Example: Fetching a resource through the authenticated client
//!
//! Loads the client configuration (environment, `.env` or a config file),
//! optionally logs in, then performs one GET and prints the JSON body.
//!
//! # Setup
//!
//! 1. Point the client at a backend: `export
//!    ERPADMIN_API_BASE_URL=http://localhost:3001/api`
//!
//! 2. Optionally provide credentials: `export ERPADMIN_USERNAME=admin
//!    ERPADMIN_PASSWORD=...`
//!
//! 3. Run this example: `cargo run -p erpadmin-infra --example fetch_resource
//!    -- /customers`

use erpadmin_common::{init_tracing, LogFormat};
use erpadmin_domain::LoginCredentials;
use erpadmin_infra::{config, ApiClient, SessionService};
use serde_json::Value;

#[tokio::main]
#[allow(clippy::print_stdout)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let format = std::env::var("ERPADMIN_LOG_FORMAT").map(|f| LogFormat::from_name(&f)).unwrap_or_default();
    init_tracing(format)?;

    let config = config::load()?;
    let client = ApiClient::builder().config(config.clone()).build()?;

    if let (Ok(username), Ok(password)) =
        (std::env::var("ERPADMIN_USERNAME"), std::env::var("ERPADMIN_PASSWORD"))
    {
        let session = SessionService::new(client.clone(), &config.api);
        session.login(&LoginCredentials { username, password }).await?;
    }

    let path = std::env::args().nth(1).unwrap_or_else(|| "/health".to_string());
    println!("GET {}{}", client.base_url(), path);

    match client.get::<Value>(&path).await {
        Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
        Err(err) => {
            let message = err.server_message().map(str::to_string).unwrap_or_else(|| err.to_string());
            println!("request failed ({}): {message}", err.label());
        }
    }

    Ok(())
}
