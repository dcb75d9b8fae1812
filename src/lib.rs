// Library crate - exports the relay components used by the server binary

pub mod api;
pub mod broker;
pub mod config;
pub mod relay;
pub mod robinhood;
pub mod signal;
pub mod types;

// Re-export commonly used types
pub use types::*;
pub use relay::TradeRelay;
pub use config::RelayConfig;
