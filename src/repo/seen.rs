use derive_more::{Display, Error, From};
use crate::domain::{Destination, OfferId, SeenRecord};
use crate::repository;

#[derive(Debug, Display, Error, From)]
#[display("storage failure: {_0}")]
pub struct StorageError(sqlx::Error);

repository!(SeenOffers,
    pub async fn has_seen(&self, offer_id: &OfferId, destination: &Destination) -> Result<bool, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM Seen_Offers WHERE offer_id = ? AND channel_id = ?")
            .bind(offer_id.as_str())
            .bind(destination.channel_id.get() as i64)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
,
    /// Idempotent: returns `false` if the pair was already recorded.
    pub async fn mark_seen(&self, record: &SeenRecord) -> Result<bool, StorageError> {
        let res = sqlx::query(
            "INSERT OR IGNORE INTO Seen_Offers (offer_id, channel_id, guild_id, announced_at)
                VALUES (?, ?, ?, ?)")
            .bind(record.offer_id.as_str())
            .bind(record.destination.channel_id.get() as i64)
            .bind(record.destination.guild_id.get() as i64)
            .bind(record.announced_at)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
);
