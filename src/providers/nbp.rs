//! Narodowy Bank Polski, table C (buy/sell) rates.

use super::util::fetch_body;
use crate::core::{RateError, RateFetcher, ensure_valid_rate};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.nbp.pl";
const RATES_PATH: &str = "/api/exchangerates/rates/c/eur/";

#[derive(Debug, Deserialize)]
struct NbpResponse {
    rates: Vec<NbpRate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NbpRate {
    bid: f64,
    effective_date: Option<String>,
}

pub struct NbpProvider {
    base_url: String,
    client: Client,
}

impl NbpProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        NbpProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl RateFetcher for NbpProvider {
    #[instrument(name = "NbpRateFetch", skip(self))]
    async fn fetch_rate(&self) -> Result<f64, RateError> {
        let url = format!("{}{}", self.base_url, RATES_PATH);
        debug!("Requesting rate from {}", url);

        let body = fetch_body(
            self.client
                .get(&url)
                .header(ACCEPT, "application/json"),
        )
        .await?;

        let data: NbpResponse = serde_json::from_str(&body)
            .map_err(|e| RateError::parse(format!("Failed to parse NBP response: {e}")))?;
        let rate = data
            .rates
            .first()
            .ok_or_else(|| RateError::parse("No rates in NBP response"))?;

        debug!(bid = rate.bid, effective_date = ?rate.effective_date, "Parsed NBP rate");
        ensure_valid_rate(rate.bid)
    }
}
