use std::sync::Arc;

use budgetdesk_api::BudgetApiClient;
use budgetdesk_core::workspace::BudgetWorkspace;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub fn init_tracing() {
    let log_format =
        std::env::var("BUDGETDESK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

pub fn build_client(config: &Config) -> anyhow::Result<Arc<BudgetApiClient>> {
    let client = BudgetApiClient::new(&config.api_config())?;
    tracing::debug!("Using budget service at {}", config.api_url);
    Ok(Arc::new(client))
}

pub fn build_workspace(client: &Arc<BudgetApiClient>) -> BudgetWorkspace {
    BudgetWorkspace::new(client.clone(), client.clone(), client.clone())
}
