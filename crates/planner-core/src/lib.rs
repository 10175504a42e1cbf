pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, GoogleConfig, PlannerConfig, ValidationResult, WeekStart};
pub use error::{AppError, AuthError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Planner core initialized");
    Ok(())
}
