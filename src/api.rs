use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Router,
};
use htmlescape::encode_minimal;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::RelayConfig;
use crate::relay::TradeRelay;
use crate::types::Outcome;

pub const UNSUBSCRIBED_MESSAGE: &str = "Unsubscribed from trading strategy";

/// Shared application state
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub relay: TradeRelay,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/trade", post(trade))
        .route("/stop-trade", post(stop_trade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - Homepage with the Start/Stop buttons
pub async fn home(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_page(&state.config, None))
}

/// POST /trade - Run the relay once and show its outcome
pub async fn trade(State(state): State<Arc<AppState>>) -> Html<String> {
    let outcome = state.relay.run().await;
    Html(render_page(&state.config, Some(&outcome)))
}

/// POST /stop-trade - Acknowledge only; nothing is cancelled
pub async fn stop_trade(State(state): State<Arc<AppState>>) -> Html<String> {
    info!("Stop trade requested");
    let outcome = Outcome::failure(UNSUBSCRIBED_MESSAGE);
    Html(render_page(&state.config, Some(&outcome)))
}

pub fn render_page(config: &RelayConfig, outcome: Option<&Outcome>) -> String {
    let message = match outcome {
        Some(o) if o.success => format!(
            "\n    <p class=\"message-success\">{}</p>",
            encode_minimal(&o.message)
        ),
        Some(o) => format!(
            "\n    <p class=\"message-error\">{}</p>",
            encode_minimal(&o.message)
        ),
        None => String::new(),
    };

    format!(
        r#"<!doctype html>
<html>
<head>
    <title>Trading Signal Homepage</title>
    <style>
      .message-success {{ color: green; }}
      .message-error {{ color: red; }}
    </style>
</head>
<body>
    <h2>Trading Signal Homepage</h2>

    <p><strong>User Email:</strong> {email}</p>
    <p><strong>Symbol:</strong> {symbol}</p>

    <form action="/trade" method="POST">
        <button type="submit">Start Trade</button>
    </form>

    <form action="/stop-trade" method="POST">
        <button type="submit">Stop Trade</button>
    </form>
{message}
</body>
</html>
"#,
        email = encode_minimal(&config.credentials.username),
        symbol = encode_minimal(&config.symbol),
        message = message,
    )
}
