use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use once_cell::sync::Lazy;
use prometheus::{Encoder, Opts, TextEncoder};

/// Register additional metrics of our own structs by using this registry instance.
static REGISTRY: Lazy<Registry> = Lazy::new(|| Registry(prometheus::Registry::new()));

// Counters of the polling loop.
pub static API_CALLS_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("api_calls", Opts::new("epic_api_calls_total", "count of requests sent to the free games API"))
});
pub static UPSTREAM_ERRORS_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("upstream_errors", Opts::new("upstream_errors_total", "count of failed fetches of the catalog"))
});
pub static OFFERS_FETCHED_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("offers_fetched", Opts::new("offers_fetched_total", "count of offers returned by the free games API"))
});
pub static STORAGE_ERRORS_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("storage_errors", Opts::new("storage_errors_total", "count of failed reads and writes of the local database"))
});
pub static DELIVERIES_COUNTER: Lazy<DeliveryCounters> = Lazy::new(|| {
    let opts = Opts::new("deliveries_total", "count of announcements sent to Discord channels");
    DeliveryCounters {
        delivered: Counter::new("deliveries (delivered)", opts.clone().const_label("result", "delivered")),
        failed: Counter::new("deliveries (failed)", opts.const_label("result", "failed")),
    }
});
pub static CYCLES_COUNTER: Lazy<CycleCounters> = Lazy::new(|| {
    let opts = Opts::new("polling_cycles_total", "count of polling cycles by outcome");
    CycleCounters {
        completed: Counter::new("cycles (completed)", opts.clone().const_label("outcome", "completed")),
        partial: Counter::new("cycles (partial)", opts.clone().const_label("outcome", "partial")),
        interrupted: Counter::new("cycles (interrupted)", opts.clone().const_label("outcome", "interrupted")),
        aborted: Counter::new("cycles (aborted)", opts.const_label("outcome", "aborted")),
    }
});

// Export special preconstructed counters for the slash command handlers.
pub static CMD_SET_CHANNEL_COUNTER: Lazy<ComplexCommandCounters> = Lazy::new(|| {
    let opts = Opts::new("command_set_channel_usage_total", "count of /set-channel invocations and successes");
    ComplexCommandCounters {
        invoked: Counter::new("command_set_channel (invoked)", opts.clone().const_label("state", "invoked")),
        finished: Counter::new("command_set_channel (finished)", opts.const_label("state", "finished")),
    }
});
pub static CMD_CLEAR_CHANNEL_COUNTER: Lazy<ComplexCommandCounters> = Lazy::new(|| {
    let opts = Opts::new("command_clear_channel_usage_total", "count of /clear-channel invocations and successes");
    ComplexCommandCounters {
        invoked: Counter::new("command_clear_channel (invoked)", opts.clone().const_label("state", "invoked")),
        finished: Counter::new("command_clear_channel (finished)", opts.const_label("state", "finished")),
    }
});
pub static CMD_COMMANDS_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_commands", Opts::new("command_commands_usage_total", "count of /commands invocations"))
});
pub static CMD_CURRENT_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_current", Opts::new("command_current_usage_total", "count of /current invocations"))
});
pub static CMD_UPCOMING_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_upcoming", Opts::new("command_upcoming_usage_total", "count of /upcoming invocations"))
});
pub static CMD_NEXT_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_next", Opts::new("command_next_usage_total", "count of /next invocations"))
});
pub static CMD_CHECK_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_check", Opts::new("command_check_usage_total", "count of /check invocations"))
});
pub static CMD_SHUTDOWN_COUNTER: Lazy<Counter> = Lazy::new(|| {
    Counter::new("command_shutdown", Opts::new("command_shutdown_usage_total", "count of /shutdown invocations"))
});


pub fn init() -> axum::Router {
    let prometheus = REGISTRY
        .register(&API_CALLS_COUNTER)
        .register(&UPSTREAM_ERRORS_COUNTER)
        .register(&OFFERS_FETCHED_COUNTER)
        .register(&STORAGE_ERRORS_COUNTER)
        .register(&DELIVERIES_COUNTER.delivered)
        .register(&DELIVERIES_COUNTER.failed)
        .register(&CYCLES_COUNTER.completed)
        .register(&CYCLES_COUNTER.partial)
        .register(&CYCLES_COUNTER.interrupted)
        .register(&CYCLES_COUNTER.aborted)
        .register(&CMD_SET_CHANNEL_COUNTER.invoked)
        .register(&CMD_SET_CHANNEL_COUNTER.finished)
        .register(&CMD_CLEAR_CHANNEL_COUNTER.invoked)
        .register(&CMD_CLEAR_CHANNEL_COUNTER.finished)
        .register(&CMD_COMMANDS_COUNTER)
        .register(&CMD_CURRENT_COUNTER)
        .register(&CMD_UPCOMING_COUNTER)
        .register(&CMD_NEXT_COUNTER)
        .register(&CMD_CHECK_COUNTER)
        .register(&CMD_SHUTDOWN_COUNTER)
        .unwrap();

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    axum::Router::new()
        .route("/metrics", get(|| async move {
            let mut buffer = vec![];
            let metrics = prometheus.gather();
            if let Err(e) = TextEncoder::new().encode(&metrics, &mut buffer) {
                log::error!("couldn't encode the metrics: {e}");
            }
            let custom_metrics = String::from_utf8_lossy(&buffer);

            metric_handle.render() + custom_metrics.as_ref()
        }))
        .layer(prometheus_layer)
}

pub struct Counter {
    inner: prometheus::Counter,
    name: String
}
pub struct ComplexCommandCounters {
    invoked: Counter,
    finished: Counter,
}
pub struct DeliveryCounters {
    pub delivered: Counter,
    pub failed: Counter,
}
pub struct CycleCounters {
    completed: Counter,
    partial: Counter,
    interrupted: Counter,
    aborted: Counter,
}
struct Registry(prometheus::Registry);

impl Counter {
    fn new(name: &str, opts: Opts) -> Counter {
        let c = prometheus::Counter::with_opts(opts)
            .unwrap_or_else(|e| panic!("unable to create {name} counter: {e}"));
        Counter { inner: c, name: name.to_string() }
    }

    pub fn inc(&self) {
        self.inner.inc()
    }

    pub fn inc_by(&self, n: usize) {
        self.inner.inc_by(n as f64)
    }

    #[cfg(test)]
    pub fn get(&self) -> f64 {
        self.inner.get()
    }
}

impl ComplexCommandCounters {
    pub fn invoked(&self) {
        self.invoked.inc()
    }

    pub fn finished(&self) {
        self.finished.inc()
    }
}

impl CycleCounters {
    pub fn inc(&self, outcome: &str) {
        match outcome {
            "completed" => self.completed.inc(),
            "partial" => self.partial.inc(),
            "interrupted" => self.interrupted.inc(),
            "aborted" => self.aborted.inc(),
            other => log::warn!("unknown cycle outcome: {other}"),
        }
    }
}

impl Registry {
    fn register(&self, counter: &Counter) -> &Self {
        self.0.register(Box::new(counter.inner.clone()))
            .unwrap_or_else(|e| panic!("unable to register the {} counter: {e}", counter.name));
        self
    }

    fn unwrap(&self) -> prometheus::Registry {
        self.0.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cycle_outcomes() {
        let before = CYCLES_COUNTER.partial.get();
        CYCLES_COUNTER.inc("partial");
        CYCLES_COUNTER.inc("bogus");
        assert!(CYCLES_COUNTER.partial.get() >= before + 1.0);
    }
}
