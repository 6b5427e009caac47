use fleet_tracker::adapters::outbound::{
    init_buffered_logger, init_combined_logger, FileHomeBaseStore, InMemoryDataStore, OsrmRoutingClient,
    TracingRenderSink,
};
use fleet_tracker::application::{SimulationService, TrackingView};
use fleet_tracker::domains::logger::ScopedLogger;
use fleet_tracker::domains::route_simulation::RouteSimulator;
use fleet_tracker::domains::{resolve_center, DataStore, HomeBaseStore, RenderSink};
use fleet_tracker::Config;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // fast_log has to claim the `log` facade before tracing does.
    let logger = init_buffered_logger(init_combined_logger("fleet-tracker.log"), 256);

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
    {
        eprintln!("tracing subscriber partially initialised: {}", e);
    }

    info!("Starting fleet tracker");

    let config = Config::load("fleet-tracker.toml").await?;

    let home_base: Arc<dyn HomeBaseStore> = Arc::new(FileHomeBaseStore::new(None, &config.home_base.path));
    let center = resolve_center(None, home_base.as_ref(), config.home_base.default_center);
    info!("Map centered on {}", center);

    let data_store = Arc::new(InMemoryDataStore::new());
    let sink: Arc<dyn RenderSink> = Arc::new(TracingRenderSink);
    let view = TrackingView::open(&config, data_store.clone() as Arc<dyn DataStore>, sink, logger.clone()).await?;

    let routing = Arc::new(OsrmRoutingClient::new(&config.routing)?);
    let simulator = Arc::new(RouteSimulator::new(
        routing,
        data_store.clone(),
        config.simulation_settings(),
        ScopedLogger::wrap("simulator", logger.clone()),
    ));
    let simulation = Arc::new(SimulationService::new(
        simulator,
        home_base,
        config.home_base.default_center,
    ));
    let playback = simulation.spawn(config.simulation.destination);

    tokio::signal::ctrl_c().await?;
    info!("Shutting down fleet tracker");

    if playback.is_finished() {
        match playback.await {
            Ok(Ok(report)) => info!("Simulation finished after {} points", report.points_published),
            Ok(Err(e)) => error!("Simulation failed: {}", e),
            Err(e) => error!("Simulation task failed: {}", e),
        }
    } else {
        playback.abort();
    }
    view.close().await?;

    Ok(())
}
