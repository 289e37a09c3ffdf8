//! Prediction-market matchers. Two sources share one contract: find
//! markets for a state's Senate primary, normalize prices into [0,1], and
//! never let a source failure escape.

use crate::client::Client;
use crate::error::Result;
use async_trait::async_trait;
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

const POLYMARKET_URL: &str =
    "https://gamma-api.polymarket.com/markets?active=true&closed=false&limit=1000";
const KALSHI_URLS: [&str; 2] = [
    "https://api.elections.kalshi.com/trade-api/v2/markets?limit=1000",
    "https://trading-api.kalshi.com/trade-api/v2/markets?limit=1000",
];

/// Listings returned per source per state.
const MAX_LISTINGS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketListing {
    pub title: String,
    pub yes_price: Option<f64>,
    pub url: String,
}

#[async_trait]
pub trait MarketSource {
    fn name(&self) -> &'static str;

    /// Markets matched to the state's Senate primary. Any network or shape
    /// failure yields an empty list.
    async fn listings(&self, client: &Client, state_name: &str) -> Vec<MarketListing>;
}

/// Coerces a price into [0,1]: values that look like percentages are
/// divided by 100, everything else is clamped.
pub fn normalize_price(value: f64) -> f64 {
    let value = if value > 1.0 { value / 100.0 } else { value };
    value.clamp(0.0, 1.0)
}

/// Prices come back as JSON numbers or numeric strings, depending on the
/// API and the field.
fn price_of(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(normalize_price(raw))
}

fn title_matches(title: &str, state_name: &str) -> bool {
    let lo = title.to_lowercase();
    lo.contains("senate")
        && lo.contains(&state_name.to_lowercase())
        && (lo.contains("primary") || lo.contains("nomination"))
}

fn str_field<'a>(market: &'a Value, fields: &[&str]) -> Option<&'a str> {
    fields.iter().find_map(|f| market.get(*f).and_then(Value::as_str))
}

pub struct Polymarket;

impl Polymarket {
    /// `outcomePrices` is either a JSON-encoded string or a plain array;
    /// the first outcome is the yes side. `lastTradePrice` is the backstop.
    fn extract_price(market: &Value) -> Option<f64> {
        match market.get("outcomePrices") {
            Some(Value::String(raw)) => {
                if let Ok(Value::Array(arr)) = serde_json::from_str(raw) {
                    if let Some(price) = arr.first().and_then(price_of) {
                        return Some(price);
                    }
                }
            }
            Some(Value::Array(arr)) => {
                if let Some(price) = arr.first().and_then(price_of) {
                    return Some(price);
                }
            }
            _ => {}
        }
        market.get("lastTradePrice").and_then(price_of)
    }

    fn liquidity(market: &Value) -> f64 {
        market
            .get("liquidity")
            .and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    fn select(markets: Vec<Value>, state_name: &str) -> Vec<MarketListing> {
        markets
            .into_iter()
            .filter(|m| {
                str_field(m, &["question", "title"])
                    .map(|t| title_matches(t, state_name))
                    .unwrap_or(false)
            })
            .sorted_by(|a, b| {
                Self::liquidity(b)
                    .partial_cmp(&Self::liquidity(a))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .take(MAX_LISTINGS)
            .map(|m| {
                let url = match str_field(&m, &["slug"]) {
                    Some(slug) => format!("https://polymarket.com/event/{slug}"),
                    None => "https://polymarket.com".to_string(),
                };
                MarketListing {
                    title: str_field(&m, &["question", "title"])
                        .unwrap_or("Market")
                        .to_string(),
                    yes_price: Self::extract_price(&m),
                    url,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketSource for Polymarket {
    fn name(&self) -> &'static str {
        "polymarket"
    }

    async fn listings(&self, client: &Client, state_name: &str) -> Vec<MarketListing> {
        let fetched: Result<Vec<Value>> = client.fetch_json(POLYMARKET_URL).await;
        match fetched {
            Ok(markets) => Self::select(markets, state_name),
            Err(e) => {
                warn!("{} fetch failed for {}: {}", self.name(), state_name, e);
                vec![]
            }
        }
    }
}

pub struct Kalshi;

impl Kalshi {
    /// The listing endpoint wraps markets in an object on one host and
    /// returns a bare array on the other.
    fn unwrap_markets(payload: Value) -> Vec<Value> {
        match payload {
            Value::Array(markets) => markets,
            Value::Object(mut obj) => match obj.remove("markets") {
                Some(Value::Array(markets)) => markets,
                _ => vec![],
            },
            _ => vec![],
        }
    }

    fn select(markets: Vec<Value>, state_name: &str) -> Vec<MarketListing> {
        markets
            .into_iter()
            .filter(|m| {
                str_field(m, &["title", "subtitle", "ticker"])
                    .map(|t| title_matches(t, state_name))
                    .unwrap_or(false)
            })
            .take(MAX_LISTINGS)
            .map(|m| {
                let yes_price = ["yes_ask", "yes_bid", "last_price"]
                    .iter()
                    .find_map(|f| m.get(*f).and_then(price_of));
                let url = match str_field(&m, &["ticker"]) {
                    Some(ticker) if !ticker.is_empty() => {
                        format!("https://kalshi.com/markets/{ticker}")
                    }
                    _ => "https://kalshi.com/markets".to_string(),
                };
                MarketListing {
                    title: str_field(&m, &["title", "subtitle", "ticker"])
                        .unwrap_or("Market")
                        .to_string(),
                    yes_price,
                    url,
                }
            })
            .collect()
    }
}

#[async_trait]
impl MarketSource for Kalshi {
    fn name(&self) -> &'static str {
        "kalshi"
    }

    async fn listings(&self, client: &Client, state_name: &str) -> Vec<MarketListing> {
        // Two hosts carry the same API; first one with matches wins.
        for url in KALSHI_URLS {
            let fetched: Result<Value> = client.fetch_json(url).await;
            match fetched {
                Ok(payload) => {
                    let out = Self::select(Self::unwrap_markets(payload), state_name);
                    if !out.is_empty() {
                        return out;
                    }
                }
                Err(e) => warn!("{} fetch failed for {}: {}", self.name(), state_name, e),
            }
        }
        vec![]
    }
}
