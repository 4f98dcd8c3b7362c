use rust_i18n::t;
use crate::domain::OfferKind;
use crate::handlers::{Invoker, Reply};
use crate::metrics;
use crate::notifier::render;
use crate::polling::LoopStatus;

/// Shows the offers of the last fetched catalog without touching the API.
pub(crate) fn offers_impl(status: &LoopStatus, kind: OfferKind, invoker: &Invoker) -> Reply {
    let (heading_key, empty_key) = match kind {
        OfferKind::Current => {
            metrics::CMD_CURRENT_COUNTER.inc();
            ("announcement.current.heading", "commands.current.empty")
        }
        OfferKind::Upcoming => {
            metrics::CMD_UPCOMING_COUNTER.inc();
            ("announcement.upcoming.heading", "commands.upcoming.empty")
        }
    };
    let embeds: Vec<_> = status.offers(kind).iter()
        .filter_map(|offer| render(offer, &invoker.locale)
            .map_err(|e| log::warn!("{e}"))
            .ok())
        .collect();
    if embeds.is_empty() {
        return Reply::ephemeral(t!(empty_key, locale = &invoker.locale))
    }
    Reply {
        content: t!(heading_key, locale = &invoker.locale),
        embeds,
        ephemeral: true,
    }
}
