//! # CiviRent
//!
//! Construction equipment rental storefront API.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export RAZORPAY_KEY_ID=rzp_test_...
//! export RAZORPAY_KEY_SECRET=...
//!
//! # Run the server
//! civirent
//! ```

use rent_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    tracing_subscriber::registry()
        .with(json_logs.then(|| fmt::layer().json()))
        .with((!json_logs).then(fmt::layer))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Listings loaded: {}", state.catalog.len());
    info!(
        "Payment provider: {}",
        state.provider_name().unwrap_or("none (credentials missing)")
    );

    // Create router
    let app = routes::create_router(state);

    info!("CiviRent starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Catalog: GET http://{}/api/equipment", addr);
        info!("Orders: POST http://{}/api/payments/order", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  CiviRent
  ━━━━━━━━━━━━━━━━━━━━━━━
  Equipment rental storefront
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
