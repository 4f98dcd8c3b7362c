use chrono::Utc;
use crate::domain::{OfferId, SeenRecord};
use crate::repo;
use crate::repo::test::{count_seen_records, destination, start_sqlite, CHANNEL_ID, GUILD_ID};

#[tokio::test]
async fn mark_seen_is_idempotent() {
    let db = start_sqlite().await;
    let seen = repo::SeenOffers::new(db.clone());
    let dest = destination(GUILD_ID, CHANNEL_ID);
    let offer_id = OfferId::new("ns:A@1");

    assert!(!seen.has_seen(&offer_id, &dest).await.expect("couldn't check the pair"));

    let record = SeenRecord {
        offer_id: offer_id.clone(),
        destination: dest,
        announced_at: Utc::now(),
    };
    assert!(seen.mark_seen(&record).await.expect("couldn't mark the pair"));
    assert_eq!(count_seen_records(&db).await, 1);

    assert!(!seen.mark_seen(&record).await.expect("couldn't mark the pair again"));
    assert_eq!(count_seen_records(&db).await, 1);

    assert!(seen.has_seen(&offer_id, &dest).await.expect("couldn't check the pair"));
}

#[tokio::test]
async fn seen_per_channel() {
    let db = start_sqlite().await;
    let seen = repo::SeenOffers::new(db.clone());
    let first = destination(GUILD_ID, CHANNEL_ID);
    let second = destination(GUILD_ID + 1, CHANNEL_ID + 1);
    let offer_id = OfferId::new("ns:A@1");

    seen.mark_seen(&SeenRecord { offer_id: offer_id.clone(), destination: first, announced_at: Utc::now() })
        .await.expect("couldn't mark the pair");

    assert!(seen.has_seen(&offer_id, &first).await.expect("couldn't check the first pair"));
    assert!(!seen.has_seen(&offer_id, &second).await.expect("couldn't check the second pair"));
    assert!(!seen.has_seen(&OfferId::new("ns:B@1"), &first).await.expect("couldn't check another offer"));
}

#[tokio::test]
async fn closed_pool_is_storage_error() {
    let db = start_sqlite().await;
    let seen = repo::SeenOffers::new(db.clone());
    db.close().await;

    let res = seen.has_seen(&OfferId::new("ns:A@1"), &destination(GUILD_ID, CHANNEL_ID)).await;
    assert!(res.is_err());
}
