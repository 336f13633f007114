use optiondesk_core::error::DeskResult;
use optiondesk_core::types::TradeDirection;
use optiondesk_data::ledger::{ClaimedCode, SettledTrade};
use optiondesk_data::models::{TradeRecord, TransactionRecord};
use rust_decimal::Decimal;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Validated parameters for opening a trade.
#[derive(Debug, Clone)]
pub struct PlaceTradeRequest {
    pub symbol: String,
    pub direction: TradeDirection,
    pub stake: Decimal,
    pub duration_secs: i64,
}

/// Commands processed by one user's account actor.
///
/// Each user's commands run on a single actor task, so two concurrent
/// requests for the same account are serialized before they reach the
/// ledger.
#[derive(Debug)]
pub enum AccountCommand {
    PlaceTrade {
        request: PlaceTradeRequest,
        reply: oneshot::Sender<DeskResult<TradeRecord>>,
    },
    /// Settle an expired trade. Replies `None` when the trade was already
    /// settled, which the expiry scheduler treats as a no-op.
    SettleTrade {
        trade_id: Uuid,
        reply: oneshot::Sender<DeskResult<Option<SettledTrade>>>,
    },
    RequestDeposit {
        amount: Decimal,
        reply: oneshot::Sender<DeskResult<TransactionRecord>>,
    },
    RequestWithdrawal {
        amount: Decimal,
        reply: oneshot::Sender<DeskResult<TransactionRecord>>,
    },
    ClaimRedeemCode {
        code: String,
        reply: oneshot::Sender<DeskResult<ClaimedCode>>,
    },
    Shutdown,
}
