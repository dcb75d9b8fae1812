//! Brokerage session seam
//!
//! The orchestrator only needs three things from a brokerage: log in, buy at
//! a limit and sell at a limit. [`crate::robinhood::RobinhoodClient`] is the
//! production implementation; tests use the generated `MockBrokerage`.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::types::LimitOrder;

/// Login credentials for the brokerage account
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// One-time MFA code, sent only when present
    pub mfa_code: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("mfa_code", &self.mfa_code.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum BrokerError {
    /// Credentials rejected, MFA challenge unanswered, or login request failed
    #[error("{0}")]
    Authentication(String),
    /// Order rejected or could not be submitted
    #[error("{0}")]
    Order(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Brokerage: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<(), BrokerError>;

    async fn place_buy_limit(&self, order: LimitOrder) -> Result<(), BrokerError>;

    async fn place_sell_limit(&self, order: LimitOrder) -> Result<(), BrokerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let creds = Credentials {
            username: "trader@example.com".to_string(),
            password: "hunter2".to_string(),
            mfa_code: Some("123456".to_string()),
        };
        let out = format!("{:?}", creds);
        assert!(out.contains("trader@example.com"));
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("123456"));
    }

    #[test]
    fn test_error_display_is_bare_detail() {
        let err = BrokerError::Authentication("invalid credentials".to_string());
        assert_eq!(err.to_string(), "invalid credentials");
    }
}
