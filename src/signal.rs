//! Master signal client
//!
//! One POST per call with `{token, symbol}`; the master answers with a single
//! [`Signal`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::types::Signal;

#[derive(Debug, Error)]
pub enum SignalError {
    /// Request could not be sent, timed out, or the body could not be read
    #[error("{0}")]
    Network(String),
    /// Master answered with something other than 200
    #[error("status {status}: {body}")]
    Server { status: u16, body: String },
    /// 200 response whose body is not a signal object
    #[error("{0}")]
    Decode(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn fetch_signal(&self, token: &str, symbol: &str) -> Result<Signal, SignalError>;
}

#[derive(Debug, Serialize)]
struct SignalRequest<'a> {
    token: &'a str,
    symbol: &'a str,
}

/// HTTP client for the master trade-signal endpoint
pub struct MasterClient {
    client: Client,
    url: String,
}

impl MasterClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn post(&self, request: &SignalRequest<'_>) -> Result<(StatusCode, String)> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.url))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {}", self.url))?;

        Ok((status, body))
    }
}

#[async_trait]
impl SignalSource for MasterClient {
    async fn fetch_signal(&self, token: &str, symbol: &str) -> Result<Signal, SignalError> {
        debug!("Requesting signal for {} from {}", symbol, self.url);

        let (status, body) = self
            .post(&SignalRequest { token, symbol })
            .await
            .map_err(|e| SignalError::Network(format!("{:#}", e)))?;

        if status != StatusCode::OK {
            return Err(SignalError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let signal: Signal =
            serde_json::from_str(&body).map_err(|e| SignalError::Decode(e.to_string()))?;

        debug!("Received signal: {:?}", signal);
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/signal", addr)
    }

    #[tokio::test]
    async fn test_fetch_signal_sends_token_and_symbol() {
        let app = Router::new().route(
            "/signal",
            post(|Json(body): Json<Value>| async move {
                if body == json!({"token": "tok-1", "symbol": "ZSC"}) {
                    (
                        AxumStatus::OK,
                        Json(json!({"action": "BUY", "symbol": "ZSC", "limitPrice": 50.0})),
                    )
                } else {
                    (AxumStatus::BAD_REQUEST, Json(json!({"error": "unexpected body"})))
                }
            }),
        );
        let client = MasterClient::new(serve(app).await).unwrap();

        let signal = client.fetch_signal("tok-1", "ZSC").await.unwrap();
        assert_eq!(signal.action, Some(json!("BUY")));
        assert_eq!(signal.symbol, Some(json!("ZSC")));
        assert_eq!(signal.quantity(), Ok(1));
        assert_eq!(signal.limit_price, Some(json!(50.0)));
    }

    #[tokio::test]
    async fn test_loosely_typed_signal_is_not_a_decode_error() {
        let app = Router::new().route(
            "/signal",
            post(|| async { Json(json!({"action": 5, "quantity": null, "limitPrice": "50.0"})) }),
        );
        let client = MasterClient::new(serve(app).await).unwrap();

        let signal = client.fetch_signal("tok-1", "ZSC").await.unwrap();
        assert_eq!(signal.side(), None);
        assert_eq!(signal.action_label(), "5");
    }

    #[tokio::test]
    async fn test_non_200_is_server_error_with_body() {
        let app = Router::new().route(
            "/signal",
            post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "bad token") }),
        );
        let client = MasterClient::new(serve(app).await).unwrap();

        match client.fetch_signal("tok-1", "ZSC").await {
            Err(SignalError::Server { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "bad token");
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let app = Router::new().route("/signal", post(|| async { "not json" }));
        let client = MasterClient::new(serve(app).await).unwrap();

        let err = client.fetch_signal("tok-1", "ZSC").await.unwrap_err();
        assert!(matches!(err, SignalError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_master_is_network_error() {
        // Grab a free port and release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = MasterClient::new(format!("http://{}/signal", addr)).unwrap();
        let err = client.fetch_signal("tok-1", "ZSC").await.unwrap_err();
        assert!(matches!(err, SignalError::Network(_)));
        assert!(err.to_string().contains("Failed to send request"));
    }
}
