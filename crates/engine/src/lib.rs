//! Trading engine for the OptionDesk platform.
//!
//! One actor per user serializes that account's balance-affecting commands;
//! the expiry scheduler feeds due trades back through the same actors so
//! settlement and user-initiated operations never race.

pub mod account_actor;
pub mod account_handle;
pub mod commands;
pub mod events;
pub mod expiry;
pub mod feed;
pub mod registry;

pub use account_handle::AccountHandle;
pub use commands::{AccountCommand, PlaceTradeRequest};
pub use events::{DeskEvent, PriceQuote};
pub use expiry::ExpiryScheduler;
pub use feed::{run_feed, PriceBoard, PriceFeed, SimulatedPriceFeed};
pub use registry::AccountRegistry;
