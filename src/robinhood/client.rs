//! Robinhood API Client
//!
//! HTTP client for the Robinhood REST API with OAuth password-grant login.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::models::*;
use crate::broker::{BrokerError, Brokerage, Credentials};
use crate::types::{LimitOrder, OrderSide};

/// Production API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.robinhood.com";

/// Public OAuth client ID used by Robinhood's own web app
pub const CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";

/// Requested token lifetime (24 hours)
const TOKEN_EXPIRES_IN: u64 = 86_400;

/// Round to the tick Robinhood accepts: cents, or 4 decimals for sub-dollar prices
pub fn round_price(price: f64) -> f64 {
    let scale = if price <= 1.0 { 10_000.0 } else { 100.0 };
    (price * scale).round() / scale
}

/// Robinhood API client holding the session token
pub struct RobinhoodClient {
    client: Client,
    base_url: String,
    device_token: String,
    /// Full `Authorization` header value once logged in
    auth: RwLock<Option<String>>,
}

impl RobinhoodClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            device_token: uuid::Uuid::new_v4().to_string(),
            auth: RwLock::new(None),
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.auth.read().await.is_some()
    }

    /// Exchange username/password (and MFA code, if any) for an access token
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        info!("Authenticating with Robinhood as {}...", credentials.username);

        let request = TokenRequest {
            grant_type: "password".to_string(),
            client_id: CLIENT_ID.to_string(),
            scope: "internal".to_string(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            device_token: self.device_token.clone(),
            expires_in: TOKEN_EXPIRES_IN,
            mfa_code: credentials.mfa_code.clone(),
        };

        let response = self
            .client
            .post(format!("{}/oauth2/token/", self.base_url))
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send authentication request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read authentication response")?;

        if !status.is_success() {
            let detail = serde_json::from_str::<TokenResponse>(&body)
                .ok()
                .and_then(|r| r.detail)
                .unwrap_or(body);
            return Err(anyhow!(
                "Authentication failed with status {}: {}",
                status,
                detail
            ));
        }

        let token: TokenResponse =
            serde_json::from_str(&body).context("Failed to parse authentication response")?;

        if let Some(detail) = token.detail {
            return Err(anyhow!("Authentication failed: {}", detail));
        }

        if token.mfa_required && token.access_token.is_none() {
            return Err(anyhow!(
                "Authentication requires an MFA code. Set MFA_CODE and try again."
            ));
        }

        let access_token = token
            .access_token
            .ok_or_else(|| anyhow!("No access token returned"))?;
        let token_type = token.token_type.unwrap_or_else(|| "Bearer".to_string());

        *self.auth.write().await = Some(format!("{} {}", token_type, access_token));

        info!("Successfully authenticated with Robinhood");
        Ok(())
    }

    async fn auth_header(&self) -> Result<String> {
        self.auth
            .read()
            .await
            .clone()
            .ok_or_else(|| anyhow!("Not logged in - call login() first"))
    }

    /// Make an authenticated GET request
    async fn get<R: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<R> {
        let auth = self.auth_header().await?;

        let response = self
            .client
            .get(format!("{}{}", self.base_url, endpoint))
            .header("Authorization", &auth)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .with_context(|| format!("Failed to read error response from {}", endpoint))?;
            return Err(anyhow!("Request to {} failed ({}): {}", endpoint, status, body));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", endpoint))
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// URL of the first brokerage account on the login
    pub async fn account_url(&self) -> Result<String> {
        let page: Page<Account> = self.get("/accounts/", &[]).await?;
        page.results
            .into_iter()
            .next()
            .map(|a| a.url)
            .ok_or_else(|| anyhow!("No brokerage accounts found"))
    }

    /// Instrument URL for a ticker symbol
    pub async fn instrument_url(&self, symbol: &str) -> Result<String> {
        let symbol = symbol.trim().to_uppercase();
        let page: Page<Instrument> = self
            .get("/instruments/", &[("symbol", symbol.as_str())])
            .await?;

        let instrument = page
            .results
            .into_iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(&symbol))
            .ok_or_else(|| anyhow!("Instrument '{}' not found", symbol))?;

        if instrument.tradeable == Some(false) {
            warn!("Instrument {} is flagged as not tradeable", symbol);
        }

        Ok(instrument.url)
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Submit a good-till-cancelled limit order, returning the order ID
    pub async fn place_limit_order(&self, order: &LimitOrder) -> Result<String> {
        let auth = self.auth_header().await?;
        let account = self.account_url().await?;
        let instrument = self.instrument_url(&order.symbol).await?;

        debug!("Placing limit order: {}", order);

        let request = OrderRequest {
            account,
            instrument,
            symbol: order.symbol.trim().to_uppercase(),
            price: round_price(order.limit_price),
            quantity: order.quantity,
            side: order.side,
            order_type: "limit".to_string(),
            time_in_force: "gtc".to_string(),
            trigger: "immediate".to_string(),
        };

        let response = self
            .client
            .post(format!("{}/orders/", self.base_url))
            .header("Authorization", &auth)
            .header("Accept", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send order request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read order response")?;

        if !status.is_success() {
            let detail = serde_json::from_str::<OrderResponse>(&body)
                .ok()
                .and_then(|r| r.detail)
                .unwrap_or(body);
            return Err(anyhow!("Order rejected ({}): {}", status, detail));
        }

        let placed: OrderResponse =
            serde_json::from_str(&body).context("Failed to parse order response")?;
        let order_id = placed
            .id
            .ok_or_else(|| anyhow!("Order placed but no order ID returned"))?;

        info!(
            "Order placed successfully: {} (ID {}, state {})",
            order,
            order_id,
            placed.state.as_deref().unwrap_or("unknown")
        );
        Ok(order_id)
    }
}

#[async_trait]
impl Brokerage for RobinhoodClient {
    async fn login(&self, credentials: &Credentials) -> Result<(), BrokerError> {
        self.authenticate(credentials)
            .await
            .map_err(|e| BrokerError::Authentication(format!("{:#}", e)))
    }

    async fn place_buy_limit(&self, order: LimitOrder) -> Result<(), BrokerError> {
        let order = LimitOrder {
            side: OrderSide::Buy,
            ..order
        };
        self.place_limit_order(&order)
            .await
            .map(|_| ())
            .map_err(|e| BrokerError::Order(format!("{:#}", e)))
    }

    async fn place_sell_limit(&self, order: LimitOrder) -> Result<(), BrokerError> {
        let order = LimitOrder {
            side: OrderSide::Sell,
            ..order
        };
        self.place_limit_order(&order)
            .await
            .map(|_| ())
            .map_err(|e| BrokerError::Order(format!("{:#}", e)))
    }
}
