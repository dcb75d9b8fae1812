use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Trading instruction returned by the master service.
///
/// Fields are kept as raw JSON values. A signal that does not ask for a trade
/// (e.g. `{"action":"HOLD","quantity":null}`) is still a well-formed response,
/// so field types are only checked once an order is actually built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    #[serde(default)]
    pub action: Option<Value>,
    #[serde(default)]
    pub symbol: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub limit_price: Option<Value>,
}

impl Signal {
    /// Order side requested by this signal, if the action is one we trade on
    pub fn side(&self) -> Option<OrderSide> {
        match self.action.as_ref().and_then(Value::as_str) {
            Some("BUY") => Some(OrderSide::Buy),
            Some("SELL") => Some(OrderSide::Sell),
            _ => None,
        }
    }

    /// Action as shown to the user; non-string values are rendered as JSON
    pub fn action_label(&self) -> String {
        match &self.action {
            None | Some(Value::Null) => "<missing>".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Order quantity, 1 when absent
    pub fn quantity(&self) -> Result<u32, String> {
        match &self.quantity {
            None | Some(Value::Null) => Ok(1),
            Some(Value::Number(n)) => {
                if let Some(q) = n.as_u64() {
                    return u32::try_from(q).map_err(|_| format!("invalid quantity {}", n));
                }
                match n.as_f64() {
                    Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u32),
                    _ => Err(format!("invalid quantity {}", n)),
                }
            }
            Some(other) => Err(format!("invalid quantity {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A limit order ready to hand to the brokerage
#[derive(Debug, Clone, PartialEq)]
pub struct LimitOrder {
    pub side: OrderSide,
    pub symbol: String,
    pub quantity: u32,
    pub limit_price: f64,
}

impl LimitOrder {
    /// Build the order described by a BUY/SELL signal.
    ///
    /// Fails with a readable reason when the signal is missing a field the
    /// brokerage needs or carries one of the wrong type.
    pub fn from_signal(side: OrderSide, signal: &Signal) -> Result<Self, String> {
        let symbol = match &signal.symbol {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            None | Some(Value::Null) => return Err("signal is missing symbol".to_string()),
            Some(other) => return Err(format!("invalid symbol {}", other)),
        };

        // Numeric strings are accepted, as the master may quote prices
        let limit_price = match &signal.limit_price {
            None | Some(Value::Null) => return Err("signal is missing limitPrice".to_string()),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        let limit_price = match limit_price {
            Some(p) if p.is_finite() && p > 0.0 => p,
            _ => {
                return Err(format!(
                    "invalid limitPrice {}",
                    signal.limit_price.as_ref().map(Value::to_string).unwrap_or_default()
                ))
            }
        };

        let quantity = signal.quantity()?;
        if quantity == 0 {
            return Err("quantity must be at least 1".to_string());
        }

        Ok(Self {
            side,
            symbol,
            quantity,
            limit_price,
        })
    }
}

impl fmt::Display for LimitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} @ {}",
            self.side, self.quantity, self.symbol, self.limit_price
        )
    }
}

/// Result of one orchestration run, ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Signal {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_quantity_defaults_to_one() {
        let signal = parse(json!({"action": "SELL", "symbol": "ZSC", "limitPrice": 12.5}));
        assert_eq!(signal.quantity(), Ok(1));
        assert_eq!(signal.side(), Some(OrderSide::Sell));

        let null_quantity = parse(json!({"action": "SELL", "quantity": null}));
        assert_eq!(null_quantity.quantity(), Ok(1));
    }

    #[test]
    fn test_quantity_accepts_integral_floats_only() {
        assert_eq!(parse(json!({"quantity": 2.0})).quantity(), Ok(2));
        assert!(parse(json!({"quantity": 2.5})).quantity().is_err());
        assert!(parse(json!({"quantity": -1})).quantity().is_err());
        assert!(parse(json!({"quantity": "3"})).quantity().is_err());
    }

    #[test]
    fn test_non_trading_signal_parses() {
        let signal = parse(json!({"action": "HOLD"}));
        assert_eq!(signal.side(), None);
        assert_eq!(signal.action_label(), "HOLD");
        assert_eq!(signal.symbol, None);

        let empty = parse(json!({}));
        assert_eq!(empty.action_label(), "<missing>");
    }

    #[test]
    fn test_loosely_typed_fields_still_parse() {
        let signal = parse(json!({"action": 5, "quantity": "many", "limitPrice": [1]}));
        assert_eq!(signal.side(), None);
        assert_eq!(signal.action_label(), "5");

        let flag = parse(json!({"action": true}));
        assert_eq!(flag.action_label(), "true");
    }

    #[test]
    fn test_action_match_is_exact() {
        assert_eq!(parse(json!({"action": "buy"})).side(), None);
        assert_eq!(parse(json!({"action": ["BUY"]})).side(), None);
    }

    #[test]
    fn test_limit_order_from_signal() {
        let signal = parse(json!({"action": "BUY", "symbol": "ZSC", "quantity": 3, "limitPrice": 50.0}));
        let order = LimitOrder::from_signal(OrderSide::Buy, &signal).unwrap();
        assert_eq!(order.symbol, "ZSC");
        assert_eq!(order.quantity, 3);
        assert_eq!(order.to_string(), "BUY 3 ZSC @ 50");

        let quoted = parse(json!({"symbol": "ZSC", "limitPrice": "12.25"}));
        assert_eq!(
            LimitOrder::from_signal(OrderSide::Sell, &quoted).unwrap().limit_price,
            12.25
        );
    }

    #[test]
    fn test_limit_order_rejects_incomplete_signal() {
        let no_symbol = parse(json!({"action": "SELL", "limitPrice": 10.0}));
        assert_eq!(
            LimitOrder::from_signal(OrderSide::Sell, &no_symbol).unwrap_err(),
            "signal is missing symbol"
        );

        let no_price = parse(json!({"action": "SELL", "symbol": "ZSC"}));
        assert_eq!(
            LimitOrder::from_signal(OrderSide::Sell, &no_price).unwrap_err(),
            "signal is missing limitPrice"
        );

        let bad_price = parse(json!({"action": "SELL", "symbol": "ZSC", "limitPrice": "abc"}));
        assert_eq!(
            LimitOrder::from_signal(OrderSide::Sell, &bad_price).unwrap_err(),
            "invalid limitPrice \"abc\""
        );

        let zero = parse(json!({"action": "SELL", "symbol": "ZSC", "limitPrice": 10.0, "quantity": 0}));
        assert!(LimitOrder::from_signal(OrderSide::Sell, &zero).is_err());

        let fractional = parse(json!({"action": "SELL", "symbol": "ZSC", "limitPrice": 10.0, "quantity": 1.5}));
        assert_eq!(
            LimitOrder::from_signal(OrderSide::Sell, &fractional).unwrap_err(),
            "invalid quantity 1.5"
        );
    }
}
