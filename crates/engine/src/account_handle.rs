use anyhow::anyhow;
use optiondesk_core::error::{DeskError, DeskResult};
use optiondesk_data::ledger::{ClaimedCode, SettledTrade};
use optiondesk_data::models::{TradeRecord, TransactionRecord};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::commands::{AccountCommand, PlaceTradeRequest};

/// Clonable handle to one user's account actor.
#[derive(Debug, Clone)]
pub struct AccountHandle {
    tx: mpsc::Sender<AccountCommand>,
}

impl AccountHandle {
    /// Creates a new handle over the actor's command channel.
    #[must_use]
    pub const fn new(tx: mpsc::Sender<AccountCommand>) -> Self {
        Self { tx }
    }

    /// Opens a trade for this user.
    ///
    /// # Errors
    /// Returns the actor's validation or ledger error, or `Internal` if the
    /// actor is unavailable.
    pub async fn place_trade(&self, request: PlaceTradeRequest) -> DeskResult<TradeRecord> {
        let (reply, rx) = oneshot::channel();
        self.send(AccountCommand::PlaceTrade { request, reply }).await?;
        recv(rx).await?
    }

    /// Settles an expired trade; `None` means it was already settled.
    ///
    /// # Errors
    /// Returns `StalePrice` when settlement must wait for a fresh quote, or
    /// `Internal` if the actor is unavailable.
    pub async fn settle_trade(&self, trade_id: Uuid) -> DeskResult<Option<SettledTrade>> {
        let (reply, rx) = oneshot::channel();
        self.send(AccountCommand::SettleTrade { trade_id, reply }).await?;
        recv(rx).await?
    }

    /// Files a pending deposit request.
    ///
    /// # Errors
    /// Returns the actor's validation error, or `Internal` if the actor is
    /// unavailable.
    pub async fn request_deposit(&self, amount: Decimal) -> DeskResult<TransactionRecord> {
        let (reply, rx) = oneshot::channel();
        self.send(AccountCommand::RequestDeposit { amount, reply }).await?;
        recv(rx).await?
    }

    /// Files a pending withdrawal request.
    ///
    /// # Errors
    /// Returns the actor's validation error, or `Internal` if the actor is
    /// unavailable.
    pub async fn request_withdrawal(&self, amount: Decimal) -> DeskResult<TransactionRecord> {
        let (reply, rx) = oneshot::channel();
        self.send(AccountCommand::RequestWithdrawal { amount, reply }).await?;
        recv(rx).await?
    }

    /// Claims a redeem code for this user.
    ///
    /// # Errors
    /// Returns the ledger's rejection, or `Internal` if the actor is
    /// unavailable.
    pub async fn claim_redeem_code(&self, code: String) -> DeskResult<ClaimedCode> {
        let (reply, rx) = oneshot::channel();
        self.send(AccountCommand::ClaimRedeemCode { code, reply }).await?;
        recv(rx).await?
    }

    /// Shuts the actor down.
    ///
    /// # Errors
    /// Returns `Internal` if the actor already stopped.
    pub async fn shutdown(&self) -> DeskResult<()> {
        self.send(AccountCommand::Shutdown).await
    }

    async fn send(&self, command: AccountCommand) -> DeskResult<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| DeskError::Internal(anyhow!("account actor unavailable")))
    }
}

async fn recv<T>(rx: oneshot::Receiver<T>) -> DeskResult<T> {
    rx.await
        .map_err(|_| DeskError::Internal(anyhow!("account actor dropped reply")))
}
