//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the order gateway, configuration, and equipment catalog.

use anyhow::Context;
use rent_core::{BoxedOrderGateway, Currency, EquipmentCatalog};
use rent_razorpay::RazorpayOrderGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit catalog file; searched for when unset
    pub catalog_path: Option<String>,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            catalog_path: lookup("CATALOG_PATH").filter(|p| !p.trim().is_empty()),
            json_logs: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Order gateway; `None` when credentials are missing outside production
    pub gateway: Option<BoxedOrderGateway>,
    /// Equipment catalog
    pub catalog: Arc<EquipmentCatalog>,
    /// Currency every order is charged in
    pub currency: Currency,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with the Razorpay gateway
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let catalog = load_equipment_catalog(&config)?;

        let gateway = match RazorpayOrderGateway::from_env() {
            Ok(gateway) => Some(Arc::new(gateway) as BoxedOrderGateway),
            Err(e) if config.is_production() => {
                anyhow::bail!("Failed to initialize Razorpay: {}", e);
            }
            Err(e) => {
                warn!("Razorpay not configured, order requests will fail: {}", e);
                None
            }
        };

        Ok(Self::with_gateway(config, catalog, gateway))
    }

    /// Assemble state from parts (tests, embedding)
    pub fn with_gateway(
        config: AppConfig,
        catalog: EquipmentCatalog,
        gateway: Option<BoxedOrderGateway>,
    ) -> Self {
        Self {
            gateway,
            catalog: Arc::new(catalog),
            currency: Currency::Inr,
            config,
        }
    }

    /// Name of the configured provider, if any
    pub fn provider_name(&self) -> Option<&'static str> {
        self.gateway.as_ref().map(|g| g.provider_name())
    }
}

/// Load equipment catalog from config file
fn load_equipment_catalog(config: &AppConfig) -> anyhow::Result<EquipmentCatalog> {
    if let Some(path) = &config.catalog_path {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path))?;
        let catalog = EquipmentCatalog::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", path))?;
        info!("Loaded {} listings from {}", catalog.len(), path);
        return Ok(catalog);
    }

    let config_paths = [
        "config/equipment.toml",
        "../config/equipment.toml",
        "../../config/equipment.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = EquipmentCatalog::from_toml(&content)
                .with_context(|| format!("Failed to parse {}", path))?;
            info!("Loaded {} listings from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    info!("No catalog file found, using built-in fleet");
    Ok(EquipmentCatalog::builtin()?)
}
