use std::sync::Arc;

use optiondesk_core::config_loader::ConfigLoader;
use optiondesk_core::settlement::PayoutSchedule;
use optiondesk_data::ledger::Ledger;
use optiondesk_data::{DatabaseClient, Repositories};
use optiondesk_engine::{
    run_feed, AccountRegistry, ExpiryScheduler, PriceBoard, SimulatedPriceFeed,
};
use optiondesk_web_api::{ApiServer, AppState, AuthService};
use tracing::info;

/// Starts the whole platform: migrations, price feed, expiry scheduler, API.
///
/// # Errors
/// Returns an error if configuration, database setup, or the server fails.
pub async fn run(config_path: &str) -> anyhow::Result<()> {
    let config = ConfigLoader::load_from(config_path)?;
    info!(config = config_path, "starting server");

    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    let pool = db.pool();

    let repos = Repositories::new(pool.clone());
    let ledger = Ledger::new(pool);
    let payouts = PayoutSchedule::new(config.trading.payout_tiers.clone())?;
    let board = PriceBoard::new(config.feed.stale_after_secs);

    let registry = Arc::new(AccountRegistry::new(
        ledger.clone(),
        repos.clone(),
        board.clone(),
        payouts,
        config.trading.clone(),
    ));

    let feed = SimulatedPriceFeed::new(&config.feed.symbols);
    let feed_config = config.feed.clone();
    let feed_board = board.clone();
    let feed_events = registry.event_sender();
    tokio::spawn(async move {
        run_feed(feed, feed_board, feed_events, &feed_config).await;
    });

    let scheduler = ExpiryScheduler::new(
        repos.clone(),
        registry.clone(),
        config.trading.settle_poll_interval_ms,
    );
    tokio::spawn(scheduler.run());

    let state = AppState {
        registry,
        repos,
        ledger,
        board,
        auth: AuthService::new(&config.auth),
    };

    let shutdown_registry = state.registry.clone();
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let server = ApiServer::new(state);

    tokio::select! {
        result = server.serve(&addr) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            shutdown_registry.shutdown_all().await;
            Ok(())
        }
    }
}
