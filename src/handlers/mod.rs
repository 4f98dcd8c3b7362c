mod channel;
mod help;
mod next;
mod offers;
mod owner;

use std::str::FromStr;
use rust_i18n::t;
use serenity::all::{ActivityData, CommandInteraction, Context, CreateEmbed, CreateInteractionResponse,
                    CreateInteractionResponseMessage, CreateMessage, EventHandler, Guild, Interaction,
                    Ready, UnavailableGuild};
use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};

pub use channel::*;
pub use help::*;
pub use next::*;
pub use offers::*;
pub use owner::*;
use crate::commands::{SlashCommand, CHANNEL_OPTION};
use crate::config::AppConfig;
use crate::domain::OfferKind;
use crate::help::HelpContainer;
use crate::notifier::{build_embed, OfferMessage};
use crate::polling::{LoopStatus, ManualTrigger, Shutdown};
use crate::{commands, repo};

pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

const SUPPORTED_LOCALES: [&str; 2] = ["en", "pl"];
// Discord refuses more embeds in one message
const MAX_EMBEDS: usize = 10;
const SETUP_HINT_COLOUR: u32 = 0xFF6B6B;

/// What a command answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub content: String,
    pub embeds: Vec<OfferMessage>,
    pub ephemeral: bool,
}

impl Reply {
    pub fn public(content: String) -> Self {
        Self { content, embeds: vec![], ephemeral: false }
    }

    pub fn ephemeral(content: String) -> Self {
        Self { content, embeds: vec![], ephemeral: true }
    }

    fn into_response(self) -> CreateInteractionResponse {
        let embeds = self.embeds.iter()
            .take(MAX_EMBEDS)
            .map(build_embed)
            .collect();
        let message = CreateInteractionResponseMessage::new()
            .content(self.content)
            .embeds(embeds)
            .ephemeral(self.ephemeral);
        CreateInteractionResponse::Message(message)
    }
}

/// Who invoked a command and where.
#[derive(Debug, Clone)]
pub struct Invoker {
    pub user_id: u64,
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub locale: String,
}

impl From<&CommandInteraction> for Invoker {
    fn from(cmd: &CommandInteraction) -> Self {
        Self {
            user_id: cmd.user.id.get(),
            guild_id: cmd.guild_id,
            channel_id: cmd.channel_id,
            locale: ensure_locale(&cmd.locale),
        }
    }
}

/// Discord sends regional locales like `en-US`; only the language part is used.
pub fn ensure_locale(locale: &str) -> String {
    let language = locale.split('-').next().unwrap_or_default();
    SUPPORTED_LOCALES.iter()
        .find(|supported| **supported == language)
        .unwrap_or(&SUPPORTED_LOCALES[0])
        .to_string()
}

pub struct Handler {
    repos: repo::Repositories,
    app_config: AppConfig,
    help: HelpContainer,
    status: LoopStatus,
    trigger: ManualTrigger,
    shutdown: Shutdown,
}

impl Handler {
    pub fn new(repos: repo::Repositories, app_config: AppConfig, help: HelpContainer,
               status: LoopStatus, trigger: ManualTrigger, shutdown: Shutdown) -> Self {
        Self { repos, app_config, help, status, trigger, shutdown }
    }

    async fn dispatch(&self, cmd: &CommandInteraction) -> anyhow::Result<Reply> {
        let invoker = Invoker::from(cmd);
        let owner_id = self.app_config.owner_id;
        let reply = match SlashCommand::from_str(&cmd.data.name)? {
            SlashCommand::SetChannel => {
                let channel = cmd.data.options.iter()
                    .find(|opt| opt.name == CHANNEL_OPTION)
                    .and_then(|opt| opt.value.as_channel_id());
                set_channel_impl(&self.repos, &invoker, channel).await?
            }
            SlashCommand::ClearChannel => clear_channel_impl(&self.repos, &invoker).await?,
            SlashCommand::Commands => commands_impl(&self.help, &invoker),
            SlashCommand::Current => offers_impl(&self.status, OfferKind::Current, &invoker),
            SlashCommand::Upcoming => offers_impl(&self.status, OfferKind::Upcoming, &invoker),
            SlashCommand::Next => next_impl(&self.status, &invoker),
            SlashCommand::Check => check_impl(owner_id, &self.trigger, &invoker),
            SlashCommand::Shutdown => shutdown_impl(owner_id, &self.shutdown, &invoker),
        };
        Ok(reply)
    }

    async fn handle_command(&self, ctx: &Context, cmd: CommandInteraction) -> HandlerResult {
        let reply = match self.dispatch(&cmd).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("couldn't handle the /{} command from {}: {e}", cmd.data.name, cmd.user.id);
                Reply::ephemeral(t!("commands.errors.unknown", locale = &ensure_locale(&cmd.locale)))
            }
        };
        cmd.create_response(&ctx.http, reply.into_response()).await?;
        Ok(())
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("{} is connected to {} guilds", ready.user.name, ready.guilds.len());
        ctx.set_activity(Some(ActivityData::watching("for free games | /commands")));
        match commands::set_global_commands(&ctx.http).await {
            Ok(registered) => log::info!("{} slash commands are registered", registered.len()),
            Err(e) => log::error!("couldn't register the slash commands: {e}"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(cmd) = interaction {
            if let Err(e) = self.handle_command(&ctx, cmd).await {
                log::error!("couldn't answer a command: {e}");
            }
        }
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        // guilds known at startup come with is_new = Some(false)
        if is_new != Some(true) {
            return
        }
        let locale = ensure_locale(&guild.preferred_locale);
        match guild_joined_impl(&self.repos, guild.id, guild.system_channel_id, &locale).await {
            Ok(Some(hint)) => {
                let embed = CreateEmbed::new()
                    .title(hint.title)
                    .description(hint.description)
                    .colour(SETUP_HINT_COLOUR);
                if let Err(e) = hint.channel_id.send_message(&ctx.http, CreateMessage::new().embed(embed)).await {
                    log::warn!("couldn't send the setup hint to the guild {}: {e}", guild.id);
                }
            }
            Ok(None) => {}
            Err(e) => log::error!("couldn't check the destination of the new guild {}: {e}", guild.id),
        }
    }

    async fn guild_delete(&self, _ctx: Context, incomplete: UnavailableGuild, _full: Option<Guild>) {
        if let Err(e) = guild_removed_impl(&self.repos, incomplete.id, incomplete.unavailable).await {
            log::error!("couldn't clear the destination of the removed guild {}: {e}", incomplete.id);
        }
    }
}


#[cfg(test)]
pub(crate) mod test_utils {
    use serenity::model::id::{ChannelId, GuildId};
    use crate::handlers::Invoker;

    pub const OWNER_ID: u64 = 1001;

    pub fn invoker(user_id: u64, guild_id: Option<u64>, channel_id: u64) -> Invoker {
        Invoker {
            user_id,
            guild_id: guild_id.map(GuildId::new),
            channel_id: ChannelId::new(channel_id),
            locale: "en".to_owned(),
        }
    }
}
