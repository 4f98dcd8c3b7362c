use chrono::{DateTime, Utc};
use rust_i18n::t;
use crate::domain::{Offer, OfferKind};
use crate::notifier::DeliveryError;

pub const EMBED_COLOUR: u32 = 0x1E3A8A;
const TITLE_LIMIT: usize = 256;
const DESCRIPTION_LIMIT: usize = 1024;

/// A rendered announcement, independent of the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferMessage {
    pub heading: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
    pub image_url: Option<String>,
}

pub fn render(offer: &Offer, locale: &str) -> Result<OfferMessage, DeliveryError> {
    offer.validate()
        .map_err(|e| DeliveryError::InvalidOffer(format!("{} ({e})", offer.id)))?;

    let (heading, window_field) = match offer.kind {
        OfferKind::Current => (
            t!("announcement.current.heading", locale = locale),
            (t!("announcement.fields.available_until", locale = locale), discord_timestamp(offer.valid_until)),
        ),
        OfferKind::Upcoming => (
            t!("announcement.upcoming.heading", locale = locale),
            (t!("announcement.fields.available_from", locale = locale), discord_timestamp(offer.valid_from)),
        ),
    };
    let mut fields = Vec::with_capacity(3);
    if let Some(seller) = offer.seller.as_ref().filter(|s| !s.is_empty()) {
        fields.push((t!("announcement.fields.seller", locale = locale), seller.clone()));
    }
    fields.push(window_field);
    if offer.kind == OfferKind::Upcoming {
        fields.push((t!("announcement.fields.available_until", locale = locale), discord_timestamp(offer.valid_until)));
    }

    Ok(OfferMessage {
        heading,
        title: truncate(&offer.title, TITLE_LIMIT),
        url: offer.url.clone(),
        description: truncate(&offer.description, DESCRIPTION_LIMIT),
        fields,
        image_url: offer.image_url.clone(),
    })
}

/// Rendered by Discord in the reader's own timezone.
fn discord_timestamp(time: DateTime<Utc>) -> String {
    let unix = time.timestamp();
    format!("<t:{unix}:f> (<t:{unix}:R>)")
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned()
    }
    let mut truncated: String = text.chars().take(limit - 1).collect();
    truncated.push('…');
    truncated
}
