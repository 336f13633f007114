pub mod audit;
pub mod redeem_code;
pub mod trade;
pub mod transaction;
pub mod user;

pub use audit::SettlementAuditRecord;
pub use redeem_code::{RedeemClaimRecord, RedeemCodeRecord};
pub use trade::TradeRecord;
pub use transaction::TransactionRecord;
pub use user::UserRecord;
