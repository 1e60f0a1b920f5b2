//! Polymarket CLOB book client: best-ask share quotes.

use barrier_common::OutcomeQuotes;
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::types::ClobBook;

const CLOB_API_URL: &str = "https://clob.polymarket.com";

/// Errors from the CLOB REST API.
#[derive(Debug, Error)]
pub enum ClobError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed book for token {token_id}: {reason}")]
    Malformed { token_id: String, reason: String },
}

/// Thin client over the CLOB book endpoint.
#[derive(Debug, Clone)]
pub struct ClobClient {
    http: Client,
    base_url: String,
}

impl ClobClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: CLOB_API_URL.to_string(),
        }
    }

    /// Point the client at a different base URL (tests).
    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Best ask for one token, or `None` when the book has no asks.
    pub async fn best_ask(&self, token_id: &str) -> Result<Option<Decimal>, ClobError> {
        let url = format!("{}/book", self.base_url);
        let book: ClobBook = self
            .http
            .get(&url)
            .query(&[("token_id", token_id)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        best_ask_of(&book, token_id)
    }

    /// Best-ask quotes for both outcome tokens.
    ///
    /// A side whose book fails to fetch is reported as missing rather than
    /// failing the whole tick; the engine skips only if the side it needs
    /// is absent.
    pub async fn outcome_quotes(
        &self,
        yes_token_id: &str,
        no_token_id: &str,
    ) -> Result<OutcomeQuotes, ClobError> {
        let (up, down) = tokio::join!(self.best_ask(yes_token_id), self.best_ask(no_token_id));
        let up = up.unwrap_or_else(|e| {
            warn!("YES book fetch failed: {}", e);
            None
        });
        let down = down.unwrap_or_else(|e| {
            warn!("NO book fetch failed: {}", e);
            None
        });
        Ok(OutcomeQuotes { up, down })
    }
}

fn best_ask_of(book: &ClobBook, token_id: &str) -> Result<Option<Decimal>, ClobError> {
    let mut best: Option<Decimal> = None;
    for level in &book.asks {
        let price = Decimal::from_str(&level.price).map_err(|e| ClobError::Malformed {
            token_id: token_id.to_string(),
            reason: format!("ask price {:?}: {}", level.price, e),
        })?;
        best = Some(match best {
            Some(b) => b.min(price),
            None => price,
        });
    }
    Ok(best)
}
