pub mod create_admin;
pub mod reconcile;
pub mod server;
