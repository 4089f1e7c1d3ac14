//! Central Exchange Market (CME) rates.
//!
//! The JSON endpoint is tried first. When it fails or has no rates, the home
//! page is fetched and the `#SaleUSDRate` / `#SaleEURORate` elements are read.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;

use super::{CurrencyRates, RateError, RateProvider};

const SOURCE: &str = "CME";
const RATE_TYPE: &str = "We Sell";
const USER_AGENT: &str = "invoice-app/1.0";

/// Endpoints and timeout for [`CmeRateProvider`].
#[derive(Debug, Clone)]
pub struct CmeOptions {
    /// JSON endpoint returning today's rates.
    pub api_url: String,
    /// Home page scraped as a fallback.
    pub page_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Fetches selling rates from cme.sr.
#[derive(Debug, Clone)]
pub struct CmeRateProvider {
    client: reqwest::Client,
    options: CmeOptions,
}

impl CmeRateProvider {
    /// Creates a provider with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(options: CmeOptions) -> Result<Self, RateError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, options })
    }

    async fn fetch_api(&self) -> Result<Option<CurrencyRates>, RateError> {
        let payload: Value = self
            .client
            .post(&self.options.api_url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_api_payload(&payload))
    }

    async fn fetch_page(&self) -> Result<CurrencyRates, RateError> {
        let html = self
            .client
            .get(&self.options.page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_home_page(&html).ok_or(RateError::Unparseable(SOURCE))
    }
}

#[async_trait]
impl RateProvider for CmeRateProvider {
    async fn current_rates(&self) -> Result<CurrencyRates, RateError> {
        match self.fetch_api().await {
            Ok(Some(rates)) => return Ok(rates),
            Ok(None) => tracing::debug!("CME API returned no rates, scraping home page"),
            Err(e) => tracing::warn!(error = %e, "CME API request failed, scraping home page"),
        }
        self.fetch_page().await
    }
}

/// Reads a rate that may be sent as a number or a numeric string.
fn rate_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extracts rates from the JSON endpoint. The payload is an object or an
/// array whose first element is the record.
pub fn parse_api_payload(payload: &Value) -> Option<CurrencyRates> {
    let record = match payload {
        Value::Array(items) => items.first()?,
        other => other,
    };
    let usd = rate_value(record.get("SaleUsdExchangeRate")?)?;
    let eur = rate_value(record.get("SaleEuroExchangeRate")?)?;

    Some(CurrencyRates {
        usd: format!("{usd:.2}"),
        eur: format!("{eur:.2}"),
        source: SOURCE.to_string(),
        rate_type: RATE_TYPE.to_string(),
        business_date: text_field(record, "BusinessDate"),
        updated_time: text_field(record, "UpdatedTime"),
    })
}

/// Returns the trimmed text content of the first element with `id`,
/// including text inside nested elements.
fn element_text(document: &Html, id: &str) -> Option<String> {
    let selector = Selector::parse(&format!("#{id}")).ok()?;
    let element = document.select(&selector).next()?;
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Extracts rates from the CME home page markup.
pub fn parse_home_page(html: &str) -> Option<CurrencyRates> {
    let document = Html::parse_document(html);
    Some(CurrencyRates {
        usd: element_text(&document, "SaleUSDRate")?,
        eur: element_text(&document, "SaleEURORate")?,
        source: SOURCE.to_string(),
        rate_type: RATE_TYPE.to_string(),
        business_date: None,
        updated_time: None,
    })
}
