use chrono::{DateTime, Utc};
use derive_more::Display;
use reqwest::Url;
use crate::domain::DomainAssertionError;

/// Stable identifier of a promotion. Two fetches of the same promotion
/// always produce the same value.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OfferId(String);

impl OfferId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum OfferKind {
    Current,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    pub id: OfferId,
    pub kind: OfferKind,
    pub title: String,
    pub description: String,
    pub seller: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub url: String,
    pub image_url: Option<String>,
}

impl Offer {
    pub fn validate(&self) -> Result<(), DomainAssertionError> {
        if self.id.as_str().trim().is_empty() {
            return Err(DomainAssertionError("offer id is empty"))
        }
        if self.title.trim().is_empty() {
            return Err(DomainAssertionError("offer title is empty"))
        }
        if self.valid_until <= self.valid_from {
            return Err(DomainAssertionError("offer validity window is empty"))
        }
        Url::parse(&self.url)
            .map_err(|_| DomainAssertionError("offer url is not a valid URL"))?;
        Ok(())
    }
}

#[cfg(test)]
impl Offer {
    pub fn stub(id: &str, title: &str) -> Self {
        let valid_from = DateTime::parse_from_rfc3339("2026-10-15T15:00:00Z")
            .expect("invalid datetime string")
            .with_timezone(&Utc);
        Self {
            id: OfferId::new(id),
            kind: OfferKind::Current,
            title: title.to_owned(),
            description: format!("{title} description"),
            seller: Some("Test Studio".to_owned()),
            valid_from,
            valid_until: valid_from + chrono::Duration::days(7),
            url: format!("https://store.epicgames.com/p/{}", title.to_lowercase().replace(' ', "-")),
            image_url: None,
        }
    }
}
