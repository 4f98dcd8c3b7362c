mod epic;

use async_trait::async_trait;
use derive_more::{Display, Error};
pub use epic::*;
use crate::domain::Offer;

#[derive(Debug, Display, Error)]
pub enum UpstreamError {
    #[display("network failure: {_0}")]
    Network(reqwest::Error),
    #[display("the request timed out")]
    Timeout,
    #[display("authentication failed with HTTP {_0}")]
    Unauthorized(#[error(not(source))] u16),
    #[display("unexpected HTTP status {_0}")]
    Status(#[error(not(source))] u16),
    #[display("malformed response: {_0}")]
    Malformed(serde_json::Error),
    #[display("the monthly quota of {_0} requests is exhausted")]
    QuotaExhausted(#[error(not(source))] u32),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(value)
        }
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(value: serde_json::Error) -> Self {
        Self::Malformed(value)
    }
}

/// Fetches the catalog of currently running promotions. Retries are the
/// caller's business.
#[async_trait]
pub trait OfferSource: Send + Sync {
    async fn fetch_current_offers(&self) -> Result<Vec<Offer>, UpstreamError>;
}
