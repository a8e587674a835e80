use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use rooms_loadtest::config::Config;
use rooms_loadtest::status::{StatusState, status_routes};
use rooms_loadtest::{
    LoadRunner, PrometheusCounters, RecordingCounters, RoomScenario, RoomsClient, SimplePushUrls,
    TeeCounters,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install the recorder before any metric is recorded
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rooms_loadtest=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Loaded configuration: base_url={}, users={}, bound={:?}",
        config.base_url,
        config.load.users,
        config.runner_config().bound
    );

    let client = Arc::new(
        RoomsClient::new(&config.base_url, config.request_timeout)
            .context("Failed to create rooms client")?,
    );
    let recording = Arc::new(RecordingCounters::new());
    let counters = Arc::new(TeeCounters(PrometheusCounters, recording.clone()));

    let scenario = RoomScenario::new(client.clone(), client, counters)
        .with_push_urls(SimplePushUrls::shared(config.simple_push_url.clone()));

    if let Some(addr) = config.status_addr() {
        let state = StatusState::new(recording.clone()).with_prometheus(prometheus_handle);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind status endpoint on {}", addr))?;
        info!("Status endpoint listening on {}", addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, status_routes(state)).await {
                warn!("Status endpoint stopped: {}", e);
            }
        });
    }

    let runner = LoadRunner::new(Arc::new(scenario), config.runner_config());
    let report = runner.run().await.with_counters(recording.snapshot());

    report.print_summary();
    println!("JSON: {}", report.to_json());

    if report.users > 0 && report.users_lost == report.users {
        anyhow::bail!("All {} virtual users were lost", report.users);
    }
    if report.scenarios_run > 0 && report.scenarios_failed == report.scenarios_run {
        anyhow::bail!("All {} scenario runs failed", report.scenarios_run);
    }

    Ok(())
}
