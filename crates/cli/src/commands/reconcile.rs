use anyhow::Context;
use optiondesk_core::config_loader::ConfigLoader;
use optiondesk_data::ledger::Ledger;
use optiondesk_data::DatabaseClient;
use tracing::info;
use uuid::Uuid;

/// Checks stored balances against transaction history, optionally repairing.
///
/// # Errors
/// Returns an error on configuration, database, or user lookup failure.
pub async fn run(config_path: &str, user: Option<&str>, repair: bool) -> anyhow::Result<()> {
    let config = ConfigLoader::load_from(config_path)?;
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    let ledger = Ledger::new(db.pool());

    let drifted = match user {
        Some(raw) => {
            let user_id = Uuid::parse_str(raw).context("invalid user id")?;
            let drift = ledger.reconcile(user_id).await?;
            if drift.is_balanced() {
                Vec::new()
            } else {
                vec![drift]
            }
        }
        None => ledger.reconcile_all().await?,
    };

    if drifted.is_empty() {
        info!("all balances match transaction history");
        return Ok(());
    }

    for drift in &drifted {
        println!("{}", serde_json::to_string(drift)?);
    }

    if repair {
        for drift in &drifted {
            ledger.repair_balance(drift.user_id).await?;
        }
        info!(count = drifted.len(), "balances repaired");
    } else {
        info!(count = drifted.len(), "drifted accounts found; re-run with --repair to fix");
    }

    Ok(())
}
