//! Robinhood API Data Models
//!
//! Request and response types for the Robinhood REST API.

use serde::{Deserialize, Serialize};

use crate::types::OrderSide;

// ============================================================================
// Authentication
// ============================================================================

/// Password grant request for `/oauth2/token/`
#[derive(Debug, Serialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub scope: String,
    pub username: String,
    pub password: String,
    /// Stable per-client device identifier
    pub device_token: String,
    /// Requested token lifetime in seconds
    pub expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa_code: Option<String>,
}

/// Response from the token endpoint
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Set when the account needs an MFA code we did not send
    #[serde(default)]
    pub mfa_required: bool,
    /// Error text if authentication failed
    #[serde(default)]
    pub detail: Option<String>,
}

// ============================================================================
// Accounts and instruments
// ============================================================================

/// Paginated list envelope used by most list endpoints
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Account {
    /// Resource URL, referenced by orders
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Instrument {
    /// Resource URL, referenced by orders
    pub url: String,
    pub symbol: String,
    #[serde(default)]
    pub tradeable: Option<bool>,
}

// ============================================================================
// Orders
// ============================================================================

/// Request body for `/orders/`
#[derive(Debug, Serialize)]
pub struct OrderRequest {
    pub account: String,
    pub instrument: String,
    pub symbol: String,
    pub price: f64,
    pub quantity: u32,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: String,
    pub time_in_force: String,
    pub trigger: String,
}

/// Response from placing an order
#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}
