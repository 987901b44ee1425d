//! exchangerate.host latest rates.

use super::util::fetch_body;
use crate::core::{RateError, RateFetcher, ensure_valid_rate};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate.host";
const RATES_PATH: &str = "/latest";
const BASE_CURRENCY: &str = "EUR";
const QUOTE_CURRENCY: &str = "PLN";

#[derive(Debug, Deserialize)]
struct ExchangerateResponse {
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

pub struct ExchangerateProvider {
    base_url: String,
    access_key: Option<String>,
    client: Client,
}

impl ExchangerateProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        ExchangerateProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: None,
            client,
        }
    }

    pub fn with_access_key(mut self, access_key: Option<String>) -> Self {
        self.access_key = access_key;
        self
    }
}

#[async_trait]
impl RateFetcher for ExchangerateProvider {
    #[instrument(name = "ExchangerateRateFetch", skip(self))]
    async fn fetch_rate(&self) -> Result<f64, RateError> {
        let mut query = vec![("base", BASE_CURRENCY), ("symbols", QUOTE_CURRENCY)];
        if let Some(key) = &self.access_key {
            query.push(("access_key", key.as_str()));
        }
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, RATES_PATH), &query)
            .map_err(|e| RateError::InvalidUrl(e.to_string()))?;
        debug!("Requesting rate from {}", url.path());

        let body = fetch_body(self.client.get(url)).await?;
        let data: ExchangerateResponse = serde_json::from_str(&body).map_err(|e| {
            RateError::parse(format!("Failed to parse Exchangerate response: {e}"))
        })?;

        if let Some(error) = data.error {
            return Err(RateError::parse(format!(
                "Exchangerate reported an error: {error}"
            )));
        }

        let rate = data
            .rates
            .as_ref()
            .and_then(|rates| rates.get(QUOTE_CURRENCY))
            .copied()
            .ok_or_else(|| {
                RateError::parse(format!("No {QUOTE_CURRENCY} rate in Exchangerate response"))
            })?;

        debug!(rate, "Parsed Exchangerate rate");
        ensure_valid_rate(rate)
    }
}
