pub mod ecb;
pub mod exchangerate;
pub mod nbp;
pub mod util;

use crate::core::RateFetcher;
use crate::core::config::{SourceConfig, SourceKind};
use reqwest::Client;

/// Builds the fetcher for a configured source.
pub fn fetcher_for(config: &SourceConfig, client: Client) -> Box<dyn RateFetcher> {
    match config.kind {
        SourceKind::Nbp => {
            let base_url = config.base_url.as_deref().unwrap_or(nbp::DEFAULT_BASE_URL);
            Box::new(nbp::NbpProvider::new(base_url, client))
        }
        SourceKind::Ecb => {
            let base_url = config.base_url.as_deref().unwrap_or(ecb::DEFAULT_BASE_URL);
            Box::new(ecb::EcbProvider::new(base_url, client))
        }
        SourceKind::Exchangerate => {
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or(exchangerate::DEFAULT_BASE_URL);
            Box::new(
                exchangerate::ExchangerateProvider::new(base_url, client)
                    .with_access_key(config.access_key.clone()),
            )
        }
    }
}
