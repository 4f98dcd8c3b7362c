use std::sync::Arc;
use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::http::Http;
use crate::domain::{Destination, Offer};
use crate::notifier::{render, Delivered, DeliveryError, Notifier, OfferMessage, EMBED_COLOUR};

pub struct DiscordNotifier {
    http: Arc<Http>,
    locale: String,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, locale: String) -> Self {
        Self { http, locale }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn deliver(&self, offer: &Offer, destination: &Destination) -> Result<Delivered, DeliveryError> {
        let message = render(offer, &self.locale)?;
        let builder = CreateMessage::new()
            .content(message.heading.clone())
            .embed(build_embed(&message));
        destination.channel_id.send_message(self.http.as_ref(), builder)
            .await
            .map(|msg| Delivered { message_id: msg.id.get() })
            .map_err(classify_error)
    }
}

pub fn build_embed(message: &OfferMessage) -> CreateEmbed {
    let embed = CreateEmbed::new()
        .title(message.title.clone())
        .url(message.url.clone())
        .colour(EMBED_COLOUR)
        .fields(message.fields.iter().map(|(name, value)| (name.clone(), value.clone(), true)));
    let embed = if message.description.is_empty() {
        embed
    } else {
        embed.description(message.description.clone())
    };
    match &message.image_url {
        Some(url) => embed.image(url.clone()),
        None => embed,
    }
}

fn classify_error(err: serenity::Error) -> DeliveryError {
    match &err {
        serenity::Error::Http(http_err) => classify_status(http_err.status_code().map(|s| s.as_u16()), err.to_string()),
        serenity::Error::Io(_) | serenity::Error::Gateway(_) => DeliveryError::TransientNetworkError(err.to_string()),
        _ => DeliveryError::Rejected(err.to_string()),
    }
}

fn classify_status(status: Option<u16>, details: String) -> DeliveryError {
    match status {
        Some(403) => DeliveryError::PermissionDenied,
        Some(404) => DeliveryError::ChannelNotFound,
        Some(429) => DeliveryError::RateLimited,
        Some(code) if code >= 500 => DeliveryError::TransientNetworkError(details),
        Some(_) => DeliveryError::Rejected(details),
        // no response at all: the request never reached Discord
        None => DeliveryError::TransientNetworkError(details),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_classify_status() {
        let details = || "details".to_owned();
        assert_eq!(classify_status(Some(403), details()), DeliveryError::PermissionDenied);
        assert_eq!(classify_status(Some(404), details()), DeliveryError::ChannelNotFound);
        assert_eq!(classify_status(Some(429), details()), DeliveryError::RateLimited);
        assert_eq!(classify_status(Some(502), details()), DeliveryError::TransientNetworkError(details()));
        assert_eq!(classify_status(Some(400), details()), DeliveryError::Rejected(details()));
        assert_eq!(classify_status(None, details()), DeliveryError::TransientNetworkError(details()));
    }
}
