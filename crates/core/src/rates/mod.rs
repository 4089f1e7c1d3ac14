//! Currency rate lookup.
//!
//! The API layer only sees the [`RateProvider`] trait; [`CmeRateProvider`]
//! is the production implementation.

pub mod cme;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cme::{CmeOptions, CmeRateProvider};

/// Selling rates for the currencies the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRates {
    /// USD rate, two decimals.
    pub usd: String,
    /// EUR rate, two decimals.
    pub eur: String,
    /// Where the rates came from.
    pub source: String,
    /// Rate kind, e.g. "We Sell".
    #[serde(rename = "type")]
    pub rate_type: String,
    /// Business date reported by the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_date: Option<String>,
    /// Last update time reported by the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_time: Option<String>,
}

/// Rate lookup errors.
#[derive(Debug, Error)]
pub enum RateError {
    /// HTTP request failed.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The source answered but carried no usable rates.
    #[error("Failed to parse {0} rates")]
    Unparseable(&'static str),
}

/// Source of today's currency rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the current rates.
    async fn current_rates(&self) -> Result<CurrencyRates, RateError>;
}
