use crate::components::AgendaService;
use crate::config::Config;
use crate::error::{other_error, AgendaResult};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> AgendaResult<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,redis=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| other_error(&format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the configuration and build the agenda service
pub fn build_service() -> AgendaResult<AgendaService> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            return Err(e);
        }
    };

    info!(
        "Agenda configured for {} calendar override(s), window of {} days",
        config.calendars.len(),
        config.limit_days
    );
    AgendaService::from_config(config)
}
