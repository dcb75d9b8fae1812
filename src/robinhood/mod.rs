//! Robinhood API Integration
//!
//! Brokerage session backed by the Robinhood REST API.
//!
//! # Components
//!
//! - [`client`] - HTTP client with OAuth password-grant login
//! - [`models`] - Request/response data types
//!
//! # API Endpoints Used
//!
//! - `POST /oauth2/token/` - Login (optionally with MFA code)
//! - `GET /accounts/` - Account lookup
//! - `GET /instruments/?symbol=...` - Instrument lookup
//! - `POST /orders/` - Place limit orders

pub mod client;
pub mod models;

pub use client::{RobinhoodClient, DEFAULT_BASE_URL};
