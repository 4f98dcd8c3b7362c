use rust_i18n::t;
use crate::handlers::{Invoker, Reply};
use crate::metrics;
use crate::polling::{LoopState, LoopStatus};

pub(crate) fn next_impl(status: &LoopStatus, invoker: &Invoker) -> Reply {
    metrics::CMD_NEXT_COUNTER.inc();
    let answer = match (status.state(), status.next_cycle_at()) {
        (LoopState::Shutdown, _) => t!("commands.next.stopped", locale = &invoker.locale),
        (_, Some(next)) => t!("commands.next.result", locale = &invoker.locale, timestamp = next.timestamp()),
        (_, None) => t!("commands.next.not_scheduled", locale = &invoker.locale),
    };
    let answer = match status.fetched_at() {
        Some(fetched_at) => {
            let last = t!("commands.next.last_fetch", locale = &invoker.locale, timestamp = fetched_at.timestamp());
            format!("{answer}\n{last}")
        }
        None => answer,
    };
    Reply::public(answer)
}
