use rust_i18n::t;
use serenity::all::{ChannelType, Command, CommandOptionType, CreateCommand, CreateCommandOption, Permissions};
use serenity::http::Http;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

pub const CHANNEL_OPTION: &str = "channel";
const DEFAULT_LOCALE: &str = "en";
const LOCALIZED: [&str; 1] = ["pl"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    SetChannel,
    ClearChannel,
    Commands,
    Current,
    Upcoming,
    Next,
    Check,
    Shutdown,
}

impl SlashCommand {
    fn i18n_key(&self) -> String {
        self.to_string().replace('-', "_")
    }

    fn requires_manage_channels(&self) -> bool {
        matches!(self, Self::SetChannel | Self::ClearChannel)
    }

    fn build(&self) -> CreateCommand {
        let key = self.i18n_key();
        let description_key = format!("commands.{key}.description");
        let mut cmd = CreateCommand::new(self.to_string())
            .description(t!(&description_key, locale = DEFAULT_LOCALE));
        for locale in LOCALIZED {
            cmd = cmd.description_localized(locale, t!(&description_key, locale = locale));
        }
        if self.requires_manage_channels() {
            cmd = cmd
                .default_member_permissions(Permissions::MANAGE_CHANNELS)
                .dm_permission(false);
        }
        if *self == Self::SetChannel {
            let option_key = format!("commands.{key}.options.{CHANNEL_OPTION}");
            let mut option = CreateCommandOption::new(CommandOptionType::Channel, CHANNEL_OPTION,
                                                      t!(&option_key, locale = DEFAULT_LOCALE))
                .channel_types(vec![ChannelType::Text, ChannelType::News])
                .required(false);
            for locale in LOCALIZED {
                option = option.description_localized(locale, t!(&option_key, locale = locale));
            }
            cmd = cmd.add_option(option);
        }
        cmd
    }
}

pub fn all_commands() -> Vec<CreateCommand> {
    SlashCommand::iter()
        .map(|cmd| cmd.build())
        .collect()
}

pub async fn set_global_commands(http: &Http) -> serenity::Result<Vec<Command>> {
    Command::set_global_commands(http, all_commands()).await
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(SlashCommand::SetChannel.to_string(), "set-channel");
        assert_eq!(SlashCommand::from_str("clear-channel"), Ok(SlashCommand::ClearChannel));
        assert!(SlashCommand::from_str("confirm").is_err());
        assert_eq!(SlashCommand::ClearChannel.i18n_key(), "clear_channel");
    }

    #[test]
    fn test_all_commands() {
        let commands = all_commands().iter()
            .map(|cmd| serde_json::to_value(cmd).expect("couldn't serialize a command"))
            .collect::<Vec<_>>();
        assert_eq!(commands.len(), 8);

        let set_channel = &commands[0];
        assert_eq!(set_channel["name"], "set-channel");
        assert_eq!(set_channel["description"], "Announce free games in this or the given channel");
        assert_eq!(set_channel["options"][0]["name"], CHANNEL_OPTION);
        assert!(!set_channel["default_member_permissions"].is_null());

        let current = &commands[3];
        assert_eq!(current["name"], "current");
        assert_eq!(current["description_localizations"]["pl"], "Pokaż aktualne darmowe gry");
        assert!(current["default_member_permissions"].is_null());
    }
}
