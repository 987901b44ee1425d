//! European Central Bank daily euro foreign exchange reference rates.

use super::util::fetch_body;
use crate::core::{RateError, RateFetcher, ensure_valid_rate};
use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use reqwest::Client;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://www.ecb.europa.eu";
const RATES_PATH: &str = "/stats/eurofxref/eurofxref-daily.xml";
const QUOTE_CURRENCY: &str = "PLN";

pub struct EcbProvider {
    base_url: String,
    client: Client,
}

impl EcbProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        EcbProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, RateError> {
    let attr = element
        .try_get_attribute(name)
        .map_err(|e| RateError::parse(format!("Malformed ECB attribute: {e}")))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| RateError::parse(format!("Malformed ECB attribute: {e}")))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// Finds `<Cube currency="{currency}" rate="..."/>` in the daily envelope.
fn find_rate(xml: &str, currency: &str) -> Result<f64, RateError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element))
                if element.local_name().as_ref() == b"Cube" =>
            {
                if attribute(&element, "currency")?.as_deref() != Some(currency) {
                    continue;
                }
                let rate = attribute(&element, "rate")?.ok_or_else(|| {
                    RateError::parse(format!("Missing rate attribute for {currency}"))
                })?;
                return rate
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| RateError::parse(format!("Invalid rate '{rate}': {e}")));
            }
            Ok(Event::Eof) => {
                return Err(RateError::parse(format!(
                    "No {currency} rate in ECB response"
                )));
            }
            Ok(_) => {}
            Err(e) => {
                return Err(RateError::parse(format!(
                    "Failed to parse ECB response at position {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }
}

#[async_trait]
impl RateFetcher for EcbProvider {
    #[instrument(name = "EcbRateFetch", skip(self))]
    async fn fetch_rate(&self) -> Result<f64, RateError> {
        let url = format!("{}{}", self.base_url, RATES_PATH);
        debug!("Requesting rate from {}", url);

        let body = fetch_body(self.client.get(&url)).await?;
        let rate = find_rate(&body, QUOTE_CURRENCY)?;

        debug!(rate, "Parsed ECB rate");
        ensure_valid_rate(rate)
    }
}
