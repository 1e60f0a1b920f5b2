//! Wire types for upstream API responses.

use serde::Deserialize;

/// Event data from the Gamma API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaEvent {
    pub id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub active: Option<bool>,
    pub closed: Option<bool>,
    pub markets: Option<Vec<GammaMarket>>,
}

/// Market data nested inside a Gamma event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    pub id: Option<String>,
    pub question: Option<String>,
    pub condition_id: Option<String>,
    pub slug: Option<String>,
    /// Token IDs as a JSON string array: `["123", "456"]`.
    pub clob_token_ids: Option<String>,
    /// Outcomes as a JSON string array: `["Up", "Down"]`.
    pub outcomes: Option<String>,
    pub active: Option<bool>,
    pub closed: Option<bool>,
}

/// Parsed token IDs for a market's two outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIds {
    pub yes_token_id: String,
    pub no_token_id: String,
}

impl GammaMarket {
    /// Decode the `clobTokenIds` JSON string into the YES/NO pair.
    pub fn token_ids(&self) -> Option<TokenIds> {
        let raw = self.clob_token_ids.as_deref()?;
        let ids: Vec<String> = serde_json::from_str(raw).ok()?;
        match ids.as_slice() {
            [yes, no, ..] => Some(TokenIds {
                yes_token_id: yes.clone(),
                no_token_id: no.clone(),
            }),
            _ => None,
        }
    }
}

/// One level of a CLOB order book (prices and sizes arrive as strings).
#[derive(Debug, Clone, Deserialize)]
pub struct ClobLevel {
    pub price: String,
    pub size: String,
}

/// A CLOB book snapshot for one token.
#[derive(Debug, Clone, Deserialize)]
pub struct ClobBook {
    #[serde(default)]
    pub bids: Vec<ClobLevel>,
    #[serde(default)]
    pub asks: Vec<ClobLevel>,
}
