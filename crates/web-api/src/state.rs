use std::sync::Arc;

use optiondesk_data::ledger::Ledger;
use optiondesk_data::Repositories;
use optiondesk_engine::{AccountRegistry, PriceBoard};

use crate::auth::AuthService;

/// Shared state handed to every handler.
///
/// Trading limits are not carried here; stake and duration validation lives
/// in the account actors so the rules apply to every entry point.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<AccountRegistry>,
    pub repos: Repositories,
    pub ledger: Ledger,
    pub board: PriceBoard,
    pub auth: AuthService,
}
