mod render;
mod discord;

use async_trait::async_trait;
use derive_more::{Display, Error};
pub use render::*;
pub use discord::*;
use crate::domain::{Destination, Offer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered {
    pub message_id: u64,
}

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[display("the bot has no access to the channel")]
    PermissionDenied,
    #[display("the channel doesn't exist anymore")]
    ChannelNotFound,
    #[display("rate limited")]
    RateLimited,
    #[display("transient network failure: {_0}")]
    TransientNetworkError(#[error(not(source))] String),
    #[display("malformed offer: {_0}")]
    InvalidOffer(#[error(not(source))] String),
    #[display("the message was rejected: {_0}")]
    Rejected(#[error(not(source))] String),
}

impl DeliveryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::TransientNetworkError(_))
    }

    /// A short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::ChannelNotFound => "channel_not_found",
            Self::RateLimited => "rate_limited",
            Self::TransientNetworkError(_) => "transient_network_error",
            Self::InvalidOffer(_) => "invalid_offer",
            Self::Rejected(_) => "rejected",
        }
    }
}

/// Sends one announcement of one offer to one destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, offer: &Offer, destination: &Destination) -> Result<Delivered, DeliveryError>;
}
