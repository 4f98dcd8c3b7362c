use crate::handlers::{Invoker, Reply};
use crate::help::HelpContainer;
use crate::metrics;

pub(crate) fn commands_impl(help: &HelpContainer, invoker: &Invoker) -> Reply {
    metrics::CMD_COMMANDS_COUNTER.inc();
    Reply::public(help.get_help_message(&invoker.locale))
}
