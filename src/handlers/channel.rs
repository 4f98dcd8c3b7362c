use rust_i18n::t;
use serenity::model::id::{ChannelId, GuildId};
use crate::domain::Destination;
use crate::handlers::{Invoker, Reply};
use crate::{metrics, repo};

pub(crate) async fn set_channel_impl(repos: &repo::Repositories, invoker: &Invoker, channel: Option<ChannelId>) -> anyhow::Result<Reply> {
    metrics::CMD_SET_CHANNEL_COUNTER.invoked();
    let Some(guild_id) = invoker.guild_id else {
        return Ok(Reply::ephemeral(t!("commands.errors.guild_only", locale = &invoker.locale)))
    };
    let destination = Destination::new(guild_id, channel.unwrap_or(invoker.channel_id));
    let previous = {
        let _guard = repos.write_guard().await;
        let previous = repos.destinations.get(guild_id).await?;
        repos.destinations.set(&destination).await?;
        previous
    };
    match previous {
        Some(prev) if prev.channel_id != destination.channel_id =>
            log::info!("the destination of the guild {guild_id} was moved from {} to {} by {}",
                prev.channel_id, destination.channel_id, invoker.user_id),
        Some(_) => {}
        None => log::info!("the destination of the guild {guild_id} was set to {} by {}",
            destination.channel_id, invoker.user_id),
    }
    metrics::CMD_SET_CHANNEL_COUNTER.finished();

    let channel = destination.channel_id.get();
    Ok(Reply::ephemeral(t!("commands.set_channel.result", locale = &invoker.locale, channel = channel)))
}

pub(crate) async fn clear_channel_impl(repos: &repo::Repositories, invoker: &Invoker) -> anyhow::Result<Reply> {
    metrics::CMD_CLEAR_CHANNEL_COUNTER.invoked();
    let Some(guild_id) = invoker.guild_id else {
        return Ok(Reply::ephemeral(t!("commands.errors.guild_only", locale = &invoker.locale)))
    };
    let cleared = {
        let _guard = repos.write_guard().await;
        repos.destinations.clear(guild_id).await?
    };
    let answer = if cleared {
        log::info!("the destination of the guild {guild_id} was cleared by {}", invoker.user_id);
        metrics::CMD_CLEAR_CHANNEL_COUNTER.finished();
        t!("commands.clear_channel.result", locale = &invoker.locale)
    } else {
        t!("commands.clear_channel.errors.not_set", locale = &invoker.locale)
    };
    Ok(Reply::ephemeral(answer))
}

/// Points a guild that has just added the bot at `/set-channel`.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupHint {
    pub channel_id: ChannelId,
    pub title: String,
    pub description: String,
}

pub(crate) async fn guild_joined_impl(repos: &repo::Repositories, guild_id: GuildId,
                                      system_channel: Option<ChannelId>, locale: &str) -> anyhow::Result<Option<SetupHint>> {
    log::info!("the bot was added to the guild {guild_id}");
    if repos.destinations.get(guild_id).await?.is_some() {
        return Ok(None)
    }
    let Some(channel_id) = system_channel else {
        log::info!("the guild {guild_id} has no system channel for the setup hint");
        return Ok(None)
    };
    Ok(Some(SetupHint {
        channel_id,
        title: t!("setup_hint.title", locale = locale),
        description: t!("setup_hint.description", locale = locale),
    }))
}

/// An outage makes a guild unavailable too, but only a real removal clears its destination.
pub(crate) async fn guild_removed_impl(repos: &repo::Repositories, guild_id: GuildId, unavailable: bool) -> anyhow::Result<bool> {
    if unavailable {
        log::warn!("the guild {guild_id} is unavailable, its destination is kept");
        return Ok(false)
    }
    let cleared = {
        let _guard = repos.write_guard().await;
        repos.destinations.clear(guild_id).await?
    };
    if cleared {
        log::info!("the bot was removed from the guild {guild_id}, its destination is cleared");
    }
    Ok(cleared)
}

#[cfg(test)]
mod test {
    use serenity::model::id::GuildId;
    use crate::handlers::test_utils::invoker;
    use crate::repo::test::{destination, start_sqlite};
    use super::*;

    #[tokio::test]
    async fn test_set_channel() {
        let db = start_sqlite().await;
        let repos = repo::Repositories::new(&db);

        let reply = set_channel_impl(&repos, &invoker(5, Some(1), 10), None).await
            .expect("couldn't set the channel");
        assert_eq!(reply, Reply::ephemeral("Free games will be announced in <#10>.".to_owned()));
        assert_eq!(repos.destinations.list().await.expect("couldn't list"), vec![destination(1, 10)]);

        set_channel_impl(&repos, &invoker(5, Some(1), 10), Some(ChannelId::new(20))).await
            .expect("couldn't set the channel");
        assert_eq!(repos.destinations.list().await.expect("couldn't list"), vec![destination(1, 20)]);
    }

    #[tokio::test]
    async fn test_guild_only() {
        let db = start_sqlite().await;
        let repos = repo::Repositories::new(&db);

        let reply = set_channel_impl(&repos, &invoker(5, None, 10), None).await
            .expect("couldn't answer");
        assert_eq!(reply.content, "This command must be used in a server.");
        let reply = clear_channel_impl(&repos, &invoker(5, None, 10)).await
            .expect("couldn't answer");
        assert_eq!(reply.content, "This command must be used in a server.");
        assert!(repos.destinations.list().await.expect("couldn't list").is_empty());
    }

    #[tokio::test]
    async fn test_clear_channel() {
        let db = start_sqlite().await;
        let repos = repo::Repositories::new(&db);
        repos.destinations.set(&destination(1, 10)).await.expect("couldn't set");

        let reply = clear_channel_impl(&repos, &invoker(5, Some(1), 10)).await
            .expect("couldn't clear the channel");
        assert_eq!(reply.content, "Announcements are turned off for this server.");
        let reply = clear_channel_impl(&repos, &invoker(5, Some(1), 10)).await
            .expect("couldn't answer");
        assert_eq!(reply.content, "No channel is set for this server.");
    }

    #[tokio::test]
    async fn test_guild_joined() {
        let db = start_sqlite().await;
        let repos = repo::Repositories::new(&db);

        let hint = guild_joined_impl(&repos, GuildId::new(1), Some(ChannelId::new(11)), "en").await
            .expect("couldn't handle the new guild")
            .expect("no setup hint for a guild without a destination");
        assert_eq!(hint.channel_id, ChannelId::new(11));
        assert!(hint.description.contains("/set-channel"));

        let hint = guild_joined_impl(&repos, GuildId::new(1), Some(ChannelId::new(11)), "pl").await
            .expect("couldn't handle the new guild")
            .expect("no setup hint for a guild without a destination");
        assert_eq!(hint.title, "Wymagana konfiguracja darmowych gier");

        let hint = guild_joined_impl(&repos, GuildId::new(1), None, "en").await
            .expect("couldn't handle the new guild");
        assert!(hint.is_none());

        repos.destinations.set(&destination(1, 10)).await.expect("couldn't set");
        let hint = guild_joined_impl(&repos, GuildId::new(1), Some(ChannelId::new(11)), "en").await
            .expect("couldn't handle the new guild");
        assert!(hint.is_none());
    }

    #[tokio::test]
    async fn test_guild_removed() {
        let db = start_sqlite().await;
        let repos = repo::Repositories::new(&db);
        repos.destinations.set(&destination(1, 10)).await.expect("couldn't set");

        let cleared = guild_removed_impl(&repos, GuildId::new(1), true).await
            .expect("couldn't handle the outage");
        assert!(!cleared);
        assert_eq!(repos.destinations.list().await.expect("couldn't list").len(), 1);

        let cleared = guild_removed_impl(&repos, GuildId::new(1), false).await
            .expect("couldn't handle the removal");
        assert!(cleared);
        assert!(repos.destinations.list().await.expect("couldn't list").is_empty());
    }
}
