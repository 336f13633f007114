use std::collections::HashMap;
use std::sync::Arc;

use optiondesk_core::config::TradingConfig;
use optiondesk_core::settlement::PayoutSchedule;
use optiondesk_data::ledger::Ledger;
use optiondesk_data::Repositories;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::account_actor::AccountActor;
use crate::account_handle::AccountHandle;
use crate::events::DeskEvent;
use crate::feed::PriceBoard;

const COMMAND_CHANNEL_CAPACITY: usize = 32;
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Registry of live account actors, spawned lazily per user.
///
/// All actors share one broadcast channel so the WebSocket hub subscribes
/// once and routes events by owner.
pub struct AccountRegistry {
    accounts: Arc<RwLock<HashMap<Uuid, AccountHandle>>>,
    ledger: Ledger,
    repos: Repositories,
    board: PriceBoard,
    payouts: PayoutSchedule,
    trading: TradingConfig,
    event_tx: broadcast::Sender<DeskEvent>,
}

impl AccountRegistry {
    /// Creates a registry with no live actors.
    #[must_use]
    pub fn new(
        ledger: Ledger,
        repos: Repositories,
        board: PriceBoard,
        payouts: PayoutSchedule,
        trading: TradingConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            ledger,
            repos,
            board,
            payouts,
            trading,
            event_tx,
        }
    }

    /// Returns the handle for a user's actor, spawning it on first use.
    pub async fn handle(&self, user_id: Uuid) -> AccountHandle {
        if let Some(handle) = self.accounts.read().await.get(&user_id) {
            return handle.clone();
        }

        let mut accounts = self.accounts.write().await;
        // Another task may have spawned it between the two locks.
        if let Some(handle) = accounts.get(&user_id) {
            return handle.clone();
        }

        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let actor = AccountActor::new(
            user_id,
            rx,
            self.ledger.clone(),
            self.repos.clone(),
            self.board.clone(),
            self.payouts.clone(),
            self.trading.clone(),
            self.event_tx.clone(),
        );
        tokio::spawn(actor.run());

        let handle = AccountHandle::new(tx);
        accounts.insert(user_id, handle.clone());
        info!(user_id = %user_id, "spawned account actor");
        handle
    }

    /// Sender side of the shared event channel.
    #[must_use]
    pub fn event_sender(&self) -> broadcast::Sender<DeskEvent> {
        self.event_tx.clone()
    }

    /// Subscribes to all engine events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.event_tx.subscribe()
    }

    /// Lists users with a live actor.
    #[must_use]
    pub async fn live_accounts(&self) -> Vec<Uuid> {
        self.accounts.read().await.keys().copied().collect()
    }

    /// Shuts down every live actor.
    pub async fn shutdown_all(&self) {
        let handles: Vec<_> = self.accounts.write().await.drain().collect();
        for (user_id, handle) in handles {
            if handle.shutdown().await.is_err() {
                info!(user_id = %user_id, "account actor already stopped");
            }
        }
    }
}
