use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use crate::config::EpicApiConfig;
use crate::domain::{Offer, OfferId, OfferKind};
use crate::offers::{OfferSource, UpstreamError};
use crate::{metrics, repo};

const STORE_PRODUCT_URL: &str = "https://store.epicgames.com/p/";
const STORE_FREE_GAMES_URL: &str = "https://store.epicgames.com/free-games";
const UPCOMING_ID_PREFIX: &str = "upcoming:";
const QUOTA_WARNING_MARGIN: u32 = 2;
const WIDE_IMAGE_TYPES: [&str; 2] = ["DieselStoreFrontWide", "OfferImageWide"];
const THUMBNAIL_IMAGE_TYPE: &str = "Thumbnail";

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CatalogResponse {
    #[serde(default)]
    current_games: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    next_games: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    id: Option<String>,
    namespace: Option<String>,
    title: Option<String>,
    description: Option<String>,
    seller: Option<Seller>,
    product_slug: Option<String>,
    url_slug: Option<String>,
    offer_mappings: Option<Vec<PageMapping>>,
    key_images: Option<Vec<KeyImage>>,
    promotions: Option<Promotions>,
}

#[derive(Deserialize)]
struct Seller {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMapping {
    page_slug: Option<String>,
}

#[derive(Deserialize)]
struct KeyImage {
    #[serde(rename = "type")]
    kind: Option<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Promotions {
    promotional_offers: Option<Vec<PromotionGroup>>,
    upcoming_promotional_offers: Option<Vec<PromotionGroup>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromotionGroup {
    promotional_offers: Option<Vec<PromotionWindow>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromotionWindow {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

/// Free games of the Epic Games Store, served by the RapidAPI proxy.
pub struct EpicGamesSource {
    client: reqwest::Client,
    config: EpicApiConfig,
    api_calls: repo::ApiCalls,
}

impl EpicGamesSource {
    pub fn new(config: EpicApiConfig, api_calls: repo::ApiCalls) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config, api_calls })
    }

    async fn count_api_call(&self) -> Result<(), UpstreamError> {
        let now = Utc::now();
        let quota = self.config.monthly_quota;
        if quota > 0 {
            match self.api_calls.get(now).await {
                Ok(count) if count >= quota => return Err(UpstreamError::QuotaExhausted(quota)),
                Ok(_) => {}
                Err(e) => log::error!("couldn't read the API call counter: {e}"),
            }
        }
        match self.api_calls.increment(now).await {
            Ok(count) if quota == 0 => log::info!("API call #{count} this month"),
            Ok(count) => {
                log::info!("API call #{count}/{quota} this month");
                if count + QUOTA_WARNING_MARGIN > quota {
                    log::warn!("approaching the monthly API quota: {count}/{quota}");
                }
            }
            Err(e) => log::error!("couldn't increment the API call counter: {e}"),
        }
        Ok(())
    }
}

#[async_trait]
impl OfferSource for EpicGamesSource {
    async fn fetch_current_offers(&self) -> Result<Vec<Offer>, UpstreamError> {
        self.count_api_call().await?;
        metrics::API_CALLS_COUNTER.inc();

        let resp = self.client.get(self.config.url.clone())
            .header("x-rapidapi-key", &self.config.api_key)
            .header("x-rapidapi-host", &self.config.host)
            .send()
            .await?;
        check_status(resp.status())?;
        let body = resp.bytes().await?;
        parse_catalog(&body)
    }
}

fn check_status(status: StatusCode) -> Result<(), UpstreamError> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(UpstreamError::Unauthorized(status.as_u16())),
        s if s.is_success() => Ok(()),
        s => Err(UpstreamError::Status(s.as_u16())),
    }
}

fn parse_catalog(body: &[u8]) -> Result<Vec<Offer>, UpstreamError> {
    let catalog: CatalogResponse = serde_json::from_slice(body)?;
    let current = catalog.current_games
        .unwrap_or_default()
        .into_iter()
        .filter_map(decode_entry)
        .filter_map(|entry| normalize(entry, OfferKind::Current));
    let upcoming = catalog.next_games
        .unwrap_or_default()
        .into_iter()
        .filter_map(decode_entry)
        .filter_map(|entry| normalize(entry, OfferKind::Upcoming));
    Ok(current.chain(upcoming).collect())
}

/// A broken entry is skipped; the rest of the catalog still counts.
fn decode_entry(value: serde_json::Value) -> Option<CatalogEntry> {
    let title = value.get("title")
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned);
    serde_json::from_value(value)
        .inspect_err(|e| log::warn!("skipping an undecodable catalog entry (title: {title:?}): {e}"))
        .ok()
}

fn normalize(entry: CatalogEntry, kind: OfferKind) -> Option<Offer> {
    let title = match entry.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_owned(),
        _ => {
            log::warn!("skipping a catalog entry without a title (id: {:?})", entry.id);
            return None
        }
    };
    let Some((valid_from, valid_until)) = promotion_window(&entry, kind) else {
        log::warn!("skipping '{title}': no promotion window in the catalog entry");
        return None
    };

    let id = offer_id(&entry, &title, kind, valid_from);
    let url = store_url(&entry);
    let image_url = image_url(&entry);
    Some(Offer {
        id,
        kind,
        description: entry.description.unwrap_or_default(),
        seller: entry.seller.and_then(|s| s.name),
        valid_from,
        valid_until,
        url,
        image_url,
        title,
    })
}

fn promotion_window(entry: &CatalogEntry, kind: OfferKind) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let promotions = entry.promotions.as_ref()?;
    let groups = match kind {
        OfferKind::Current => promotions.promotional_offers.as_ref(),
        OfferKind::Upcoming => promotions.upcoming_promotional_offers.as_ref()
            .filter(|groups| !groups.is_empty())
            .or(promotions.promotional_offers.as_ref()),
    }?;
    groups.iter()
        .flat_map(|group| group.promotional_offers.iter().flatten())
        .find_map(|window| window.start_date.zip(window.end_date))
}

fn offer_id(entry: &CatalogEntry, title: &str, kind: OfferKind, valid_from: DateTime<Utc>) -> OfferId {
    let key = match (&entry.namespace, &entry.id) {
        (Some(namespace), Some(id)) => format!("{namespace}:{id}"),
        (None, Some(id)) => id.clone(),
        _ => format!("{:x}", Sha256::digest(title.as_bytes()))[..16].to_owned(),
    };
    let prefix = match kind {
        OfferKind::Current => "",
        OfferKind::Upcoming => UPCOMING_ID_PREFIX,
    };
    OfferId::new(format!("{prefix}{key}@{}", valid_from.timestamp()))
}

fn store_url(entry: &CatalogEntry) -> String {
    let mapping_slug = entry.offer_mappings.iter()
        .flatten()
        .find_map(|m| m.page_slug.clone());
    let product_slug = entry.product_slug.as_deref()
        .map(|slug| slug.trim_end_matches("/home").to_owned());
    [mapping_slug, product_slug, entry.url_slug.clone()]
        .into_iter()
        .flatten()
        .find(|slug| !slug.is_empty())
        .map(|slug| format!("{STORE_PRODUCT_URL}{slug}"))
        .unwrap_or_else(|| STORE_FREE_GAMES_URL.to_owned())
}

fn image_url(entry: &CatalogEntry) -> Option<String> {
    let images = entry.key_images.as_deref().unwrap_or_default();
    let find = |types: &[&str]| images.iter()
        .filter(|img| img.kind.as_deref().is_some_and(|kind| types.contains(&kind)))
        .find_map(|img| img.url.clone());
    find(&WIDE_IMAGE_TYPES[..]).or_else(|| find(&[THUMBNAIL_IMAGE_TYPE][..]))
}
