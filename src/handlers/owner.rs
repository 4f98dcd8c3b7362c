use rust_i18n::t;
use crate::handlers::{Invoker, Reply};
use crate::metrics;
use crate::polling::{ManualTrigger, Shutdown, TriggerResult};

pub(crate) fn check_impl(owner_id: u64, trigger: &ManualTrigger, invoker: &Invoker) -> Reply {
    metrics::CMD_CHECK_COUNTER.inc();
    if invoker.user_id != owner_id {
        return Reply::ephemeral(t!("commands.errors.owner_only", locale = &invoker.locale))
    }
    let answer = match trigger.request() {
        TriggerResult::Queued => {
            log::info!("a manual check was requested by {}", invoker.user_id);
            t!("commands.check.queued", locale = &invoker.locale)
        }
        TriggerResult::AlreadyQueued => t!("commands.check.already_queued", locale = &invoker.locale),
        TriggerResult::Stopped => t!("commands.next.stopped", locale = &invoker.locale),
    };
    Reply::ephemeral(answer)
}

pub(crate) fn shutdown_impl(owner_id: u64, shutdown: &Shutdown, invoker: &Invoker) -> Reply {
    metrics::CMD_SHUTDOWN_COUNTER.inc();
    if invoker.user_id != owner_id {
        return Reply::ephemeral(t!("commands.errors.owner_only", locale = &invoker.locale))
    }
    log::info!("shutdown was requested by {}", invoker.user_id);
    shutdown.trigger();
    Reply::public(t!("commands.shutdown.result", locale = &invoker.locale))
}
