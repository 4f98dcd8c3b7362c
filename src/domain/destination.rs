use chrono::{DateTime, Utc};
use serenity::model::id::{ChannelId, GuildId};

/// A channel that receives announcements. There is at most one per guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{guild_id}/{channel_id}")]
pub struct Destination {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
}

impl Destination {
    pub fn new(guild_id: impl Into<GuildId>, channel_id: impl Into<ChannelId>) -> Self {
        Self {
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// One successful delivery of an offer to a destination.
#[derive(Debug, Clone, PartialEq)]
pub struct SeenRecord {
    pub offer_id: crate::domain::OfferId,
    pub destination: Destination,
    pub announced_at: DateTime<Utc>,
}
