//! Rate fetching abstraction

use super::error::RateError;
use async_trait::async_trait;

/// Fetches the current EUR/PLN rate from one external provider.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch_rate(&self) -> Result<f64, RateError>;
}

/// Rejects values that can't take part in a lowest-rate comparison.
pub fn ensure_valid_rate(rate: f64) -> Result<f64, RateError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(RateError::parse(format!("Invalid rate value: {rate}")))
    }
}
