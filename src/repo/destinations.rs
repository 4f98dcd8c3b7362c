use chrono::Utc;
use serenity::model::id::{ChannelId, GuildId};
use crate::domain::Destination;
use crate::repo::ensure_only_one_row_updated;
use crate::repository;

#[derive(sqlx::FromRow)]
struct DestinationEntity {
    guild_id: i64,
    channel_id: i64,
}

impl TryFrom<DestinationEntity> for Destination {
    type Error = anyhow::Error;

    fn try_from(value: DestinationEntity) -> Result<Self, Self::Error> {
        let guild_id = u64::try_from(value.guild_id)?;
        let channel_id = u64::try_from(value.channel_id)?;
        if guild_id == 0 || channel_id == 0 {
            anyhow::bail!("zero id in the Destinations table: {guild_id}/{channel_id}")
        }
        Ok(Destination::new(GuildId::new(guild_id), ChannelId::new(channel_id)))
    }
}

repository!(Destinations,
    /// Returns the destinations in the order their guilds were first registered.
    pub async fn list(&self) -> anyhow::Result<Vec<Destination>> {
        sqlx::query_as::<_, DestinationEntity>(
            "SELECT guild_id, channel_id FROM Destinations ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Destination::try_from)
            .collect()
    }
,
    pub async fn get(&self, guild_id: GuildId) -> anyhow::Result<Option<Destination>> {
        sqlx::query_as::<_, DestinationEntity>(
            "SELECT guild_id, channel_id FROM Destinations WHERE guild_id = ?")
            .bind(guild_id.get() as i64)
            .fetch_optional(&self.pool)
            .await?
            .map(Destination::try_from)
            .transpose()
    }
,
    /// Creates or replaces the destination of the guild.
    pub async fn set(&self, destination: &Destination) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO Destinations (guild_id, channel_id, registered_at) VALUES (?, ?, ?)
                ON CONFLICT (guild_id) DO UPDATE SET channel_id = excluded.channel_id")
            .bind(destination.guild_id.get() as i64)
            .bind(destination.channel_id.get() as i64)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Into::into)
            .and_then(ensure_only_one_row_updated)?;
        Ok(())
    }
,
    /// Returns `false` if the guild had no destination.
    pub async fn clear(&self, guild_id: GuildId) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM Destinations WHERE guild_id = ?")
            .bind(guild_id.get() as i64)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
);
