pub mod audit_repo;
pub mod redeem_code_repo;
pub mod trade_repo;
pub mod transaction_repo;
pub mod user_repo;

pub use audit_repo::AuditRepository;
pub use redeem_code_repo::RedeemCodeRepository;
pub use trade_repo::TradeRepository;
pub use transaction_repo::TransactionRepository;
pub use user_repo::UserRepository;

use sqlx::PgPool;

/// Bundle of all repositories sharing one connection pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub users: UserRepository,
    pub trades: TradeRepository,
    pub transactions: TransactionRepository,
    pub redeem_codes: RedeemCodeRepository,
    pub audits: AuditRepository,
}

impl Repositories {
    /// Creates repositories over a shared pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            trades: TradeRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            redeem_codes: RedeemCodeRepository::new(pool.clone()),
            audits: AuditRepository::new(pool),
        }
    }
}
