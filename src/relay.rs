//! Trade orchestration: login, fetch signal, place order.
//!
//! Every failure is folded into an [`Outcome`] for display. Nothing is
//! retried and concurrent runs are not coordinated.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::broker::{BrokerError, Brokerage};
use crate::config::RelayConfig;
use crate::signal::{SignalError, SignalSource};
use crate::types::{LimitOrder, OrderSide, Outcome};

pub const SUBSCRIBED_MESSAGE: &str = "Subscribed successfully to trading strategy";

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Robinhood login failed: {0}")]
    Login(BrokerError),
    #[error("Error calling master: {0}")]
    MasterUnreachable(String),
    #[error("Master returned error: {0}")]
    MasterRejected(String),
    #[error("Master returned an invalid signal: {0}")]
    InvalidSignal(String),
    #[error("No valid action in signal: {0}")]
    UnrecognizedAction(String),
    #[error("Order placement failed: {0}")]
    Order(String),
}

impl From<SignalError> for TradeError {
    fn from(err: SignalError) -> Self {
        match err {
            SignalError::Network(detail) => Self::MasterUnreachable(detail),
            SignalError::Server { body, .. } => Self::MasterRejected(body),
            SignalError::Decode(detail) => Self::InvalidSignal(detail),
        }
    }
}

/// Runs the login → signal → order sequence against injected collaborators
pub struct TradeRelay {
    config: Arc<RelayConfig>,
    broker: Arc<dyn Brokerage>,
    signals: Arc<dyn SignalSource>,
}

impl TradeRelay {
    pub fn new(
        config: Arc<RelayConfig>,
        broker: Arc<dyn Brokerage>,
        signals: Arc<dyn SignalSource>,
    ) -> Self {
        Self {
            config,
            broker,
            signals,
        }
    }

    /// Run once and return the order that was placed
    pub async fn execute(&self) -> Result<LimitOrder, TradeError> {
        self.broker
            .login(&self.config.credentials)
            .await
            .map_err(TradeError::Login)?;
        debug!("Logged in as {}", self.config.credentials.username);

        let signal = self
            .signals
            .fetch_signal(&self.config.user_token, &self.config.symbol)
            .await?;
        info!("Signal for {}: {:?}", self.config.symbol, signal);

        let side = signal
            .side()
            .ok_or_else(|| TradeError::UnrecognizedAction(signal.action_label()))?;
        let order = LimitOrder::from_signal(side, &signal).map_err(TradeError::Order)?;

        let placed = match side {
            OrderSide::Buy => self.broker.place_buy_limit(order.clone()).await,
            OrderSide::Sell => self.broker.place_sell_limit(order.clone()).await,
        };
        placed.map_err(|e| TradeError::Order(e.to_string()))?;

        Ok(order)
    }


    /// Run once and fold the result into a displayable outcome
    pub async fn run(&self) -> Outcome {
        match self.execute().await {
            Ok(order) => {
                info!("Trade relayed: {}", order);
                Outcome::success(SUBSCRIBED_MESSAGE)
            }
            Err(e) => {
                warn!("Trade relay failed: {}", e);
                Outcome::failure(e.to_string())
            }
        }
    }

    /// Startup run, only when `AUTO_TRADE` is set. The outcome is logged,
    /// never rendered.
    pub async fn auto_trade(&self) -> Option<Outcome> {
        if !self.config.auto_trade {
            return None;
        }

        info!("AUTO_TRADE is true. Invoking trade logic at startup...");
        let outcome = self.run().await;
        if outcome.success {
            info!("AUTO_TRADE success: {}", outcome.message);
        } else {
            error!("AUTO_TRADE error: {}", outcome.message);
        }
        Some(outcome)
    }
}
