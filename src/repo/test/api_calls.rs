use chrono::{DateTime, Utc};
use crate::repo;
use crate::repo::test::start_sqlite;

fn parse(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("invalid datetime string")
        .with_timezone(&Utc)
}

#[tokio::test]
async fn counter_resets_every_month() {
    let db = start_sqlite().await;
    let api_calls = repo::ApiCalls::new(db);
    let october = parse("2026-10-18T17:01:00+00:00");
    let november = parse("2026-11-01T00:00:01+00:00");

    assert_eq!(api_calls.get(october).await.expect("couldn't get the counter"), 0);
    assert_eq!(api_calls.increment(october).await.expect("couldn't increment the counter"), 1);
    assert_eq!(api_calls.increment(october).await.expect("couldn't increment the counter"), 2);
    assert_eq!(api_calls.get(october).await.expect("couldn't get the counter"), 2);

    assert_eq!(api_calls.increment(november).await.expect("couldn't increment the counter"), 1);
    assert_eq!(api_calls.get(october).await.expect("couldn't get the counter"), 2);
}
