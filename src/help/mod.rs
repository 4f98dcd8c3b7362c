use std::time::Duration;
use serde::Serialize;
use tinytemplate::TinyTemplate;

static EN_HELP: &str = include_str!("en.md");
static PL_HELP: &str = include_str!("pl.md");

#[derive(Clone)]
pub struct HelpContainer {
    en: String,
    pl: String,
}

impl HelpContainer {
    pub fn get_help_message(&self, locale: &str) -> String {
        match locale {
            "pl" => self.pl.clone(),
            _ => self.en.clone()
        }
    }
}

#[derive(Serialize, Clone)]
pub struct Context {
    pub bot_name: String,
    pub interval: String,
    pub announce_upcoming: bool,
}

/// `12 h`, `15 min` or `1 h 30 min`; the units read the same in every supported language.
pub fn format_interval(interval: Duration) -> String {
    let minutes = (interval.as_secs() / 60).max(1);
    match (minutes / 60, minutes % 60) {
        (0, mins) => format!("{mins} min"),
        (hours, 0) => format!("{hours} h"),
        (hours, mins) => format!("{hours} h {mins} min"),
    }
}

pub fn render_help_messages(context: Context) -> Result<HelpContainer, tinytemplate::error::Error> {
    let mut tt = TinyTemplate::new();
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("en", EN_HELP)?;
    tt.add_template("pl", PL_HELP)?;
    Ok(HelpContainer {
        en: tt.render("en", &context)?,
        pl: tt.render("pl", &context)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_render_help_messages() {
        let context = Context {
            bot_name: "Fred".to_owned(),
            interval: format_interval(Duration::from_secs(12 * 3600)),
            announce_upcoming: false,
        };
        let help = render_help_messages(context).expect("couldn't render the help messages");

        let en = help.get_help_message("en");
        assert!(en.starts_with("**Fred** announces free games"));
        assert!(en.contains("every 12 h"));
        assert!(!en.contains("announced too"));
        assert!(help.get_help_message("pl").contains("co 12 h"));
        assert_eq!(help.get_help_message("de"), en);
    }

    #[test]
    fn test_short_interval() {
        let context = Context {
            bot_name: "Fred".to_owned(),
            interval: format_interval(Duration::from_secs(15 * 60)),
            announce_upcoming: false,
        };
        let help = render_help_messages(context).expect("couldn't render the help messages");
        assert!(help.get_help_message("en").contains("checked every 15 min."));
        assert!(help.get_help_message("pl").contains("sprawdzany co 15 min."));
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(Duration::from_secs(15 * 60)), "15 min");
        assert_eq!(format_interval(Duration::from_secs(720 * 60)), "12 h");
        assert_eq!(format_interval(Duration::from_secs(90 * 60)), "1 h 30 min");
        assert_eq!(format_interval(Duration::from_secs(10)), "1 min");
    }
}
