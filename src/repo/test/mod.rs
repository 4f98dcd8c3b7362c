mod seen;
mod api_calls;

use std::str::FromStr;
use serenity::model::id::{ChannelId, GuildId};
use sqlx::{Pool, Sqlite};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use crate::domain::Destination;
use crate::repo::MIGRATOR;

pub const GUILD_ID: u64 = 12345;
pub const CHANNEL_ID: u64 = 67890;

/// An in-memory database lives as long as its only connection does, so the
/// pool must never recycle it.
pub async fn start_sqlite() -> Pool<Sqlite> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("invalid database URL");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await.expect("couldn't establish a database connection");
    MIGRATOR.run(&pool)
        .await.expect("couldn't apply migrations");
    pool
}

pub fn destination(guild_id: u64, channel_id: u64) -> Destination {
    Destination::new(GuildId::new(guild_id), ChannelId::new(channel_id))
}

pub async fn count_seen_records(db: &Pool<Sqlite>) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM Seen_Offers")
        .fetch_one(db)
        .await.expect("couldn't count seen offers")
}
