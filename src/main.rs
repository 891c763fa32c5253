//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use apr_console::adapters::http::ApiClient;
use apr_console::adapters::mock::MockBackend;
use apr_console::adapters::ui::ConsoleUi;
use apr_console::ports::{AnalyticsGateway, ChatGateway, DataGateway, InputPort};
use apr_console::shared::config::AppConfig;
use apr_console::usecases::{ChatService, DashboardService};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = &env_loaded {
        info!(path = %path.display(), "loaded .env");
    }

    apr_console::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_default();

    // Demo mode serves canned data; otherwise one ApiClient backs all
    // three gateways.
    let (analytics, chat_gateway, data): (
        Arc<dyn AnalyticsGateway>,
        Arc<dyn ChatGateway>,
        Arc<dyn DataGateway>,
    ) = if cfg.demo_mode() {
        info!("demo mode: serving canned data, no backend required");
        let backend = Arc::new(MockBackend::new());
        (
            Arc::clone(&backend) as Arc<dyn AnalyticsGateway>,
            Arc::clone(&backend) as Arc<dyn ChatGateway>,
            backend as Arc<dyn DataGateway>,
        )
    } else {
        let base_url = cfg.api_base_url_or_default();
        let timeout = Duration::from_secs(cfg.request_timeout_secs_or_default());
        info!(base_url = %base_url, timeout_secs = timeout.as_secs(), "connecting to backend");
        let client = Arc::new(
            ApiClient::new(base_url, timeout).map_err(|e| anyhow::anyhow!("{}", e))?,
        );
        (
            Arc::clone(&client) as Arc<dyn AnalyticsGateway>,
            Arc::clone(&client) as Arc<dyn ChatGateway>,
            client as Arc<dyn DataGateway>,
        )
    };

    let dashboard = Arc::new(DashboardService::new(analytics));
    let chat = Arc::new(ChatService::new(chat_gateway));

    let input_port: Arc<dyn InputPort> = Arc::new(ConsoleUi::new(
        dashboard,
        chat,
        data,
        cfg.drift_window_days_or_default(),
        cfg.anomaly_days_or_default(),
    ));

    input_port.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
