mod retry;
mod schedule;
mod shutdown;
mod status;


use std::sync::Arc;
use chrono::Utc;
use derive_more::Display;
use tokio::sync::mpsc;
use tokio::time::Instant;
pub use retry::*;
pub use schedule::*;
pub use shutdown::*;
pub use status::*;
use crate::config::PollingConfig;
use crate::dedup::{self, PendingDelivery, SeenSnapshot};
use crate::domain::{Destination, Offer, OfferId, OfferKind, SeenRecord};
use crate::notifier::{Delivered, DeliveryError, Notifier};
use crate::offers::{OfferSource, UpstreamError};
use crate::{metrics, repo};

#[derive(Debug, Display)]
pub enum CycleAbort {
    #[display("upstream failure: {_0}")]
    Upstream(UpstreamError),
    #[display("couldn't load destinations: {_0}")]
    Registry(String),
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub fetched: usize,
    pub pending: usize,
    pub delivered: Vec<(OfferId, Destination)>,
    pub failed: Vec<(OfferId, Destination, DeliveryError)>,
    pub committed: usize,
    pub store_degraded: bool,
    pub interrupted: bool,
    pub aborted: Option<CycleAbort>,
}

impl CycleReport {
    fn outcome(&self) -> &'static str {
        match (&self.aborted, self.interrupted, self.failed.is_empty()) {
            (Some(_), _, _) => "aborted",
            (None, true, _) => "interrupted",
            (None, false, false) => "partial",
            (None, false, true) => "completed",
        }
    }
}

/// Fetch → deduplicate → deliver → commit, on a fixed schedule. Cycles never
/// overlap: the loop is a single task and the next trigger waits for the
/// running cycle.
pub struct PollingLoop {
    source: Arc<dyn OfferSource>,
    notifier: Arc<dyn Notifier>,
    repos: repo::Repositories,
    config: PollingConfig,
    status: LoopStatus,
    shutdown: Shutdown,
}

impl PollingLoop {
    pub fn new(source: Arc<dyn OfferSource>, notifier: Arc<dyn Notifier>, repos: repo::Repositories,
               config: PollingConfig, status: LoopStatus, shutdown: Shutdown) -> Self {
        Self { source, notifier, repos, config, status, shutdown }
    }

    pub async fn run(self, mut manual_triggers: mpsc::Receiver<()>) {
        log::info!("The polling loop is starting with an interval of {:?}", self.config.interval);
        let mut schedule = Schedule::new(self.config.interval, Instant::now());
        loop {
            self.status.set_state(LoopState::Idle);
            self.status.set_next_cycle_at(Some(schedule.due_at_utc(Instant::now(), Utc::now())));
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => break,
                _ = tokio::time::sleep_until(schedule.due()) => {
                    schedule.advance(Instant::now());
                    log::debug!("a scheduled cycle is due");
                }
                Some(()) = manual_triggers.recv() => log::info!("a manual cycle was requested"),
            }
            self.run_cycle().await;
            if self.shutdown.is_triggered() {
                break
            }
        }
        self.status.set_next_cycle_at(None);
        self.status.set_state(LoopState::Shutdown);
        log::info!("The polling loop has stopped");
    }

    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        self.status.set_state(LoopState::Fetching);
        let catalog = match self.source.fetch_current_offers().await {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("couldn't fetch the current offers: {e}");
                metrics::UPSTREAM_ERRORS_COUNTER.inc();
                report.aborted = Some(CycleAbort::Upstream(e));
                return self.finish(report)
            }
        };
        report.fetched = catalog.len();
        metrics::OFFERS_FETCHED_COUNTER.inc_by(catalog.len());
        let offers: Vec<Offer> = catalog.iter()
            .filter(|offer| offer.kind == OfferKind::Current || self.config.announce_upcoming)
            .cloned()
            .collect();
        self.status.set_catalog(catalog, Utc::now());

        if self.interrupted(&mut report) {
            return self.finish(report)
        }
        self.status.set_state(LoopState::Deduplicating);
        let destinations = match self.repos.destinations.list().await {
            Ok(destinations) => destinations,
            Err(e) => {
                log::error!("couldn't load the destinations: {e}");
                metrics::STORAGE_ERRORS_COUNTER.inc();
                report.aborted = Some(CycleAbort::Registry(e.to_string()));
                return self.finish(report)
            }
        };
        let snapshot = SeenSnapshot::load(&self.repos.seen, &offers, &destinations).await;
        report.store_degraded = snapshot.is_degraded();
        let pending = dedup::pending_deliveries(&offers, &destinations, &snapshot);
        report.pending = pending.len();

        self.status.set_state(LoopState::Delivering);
        for PendingDelivery { offer, destination } in pending {
            if self.interrupted(&mut report) {
                break
            }
            match self.deliver_with_retries(offer, &destination).await {
                Ok(Delivered { message_id }) => {
                    log::info!("'{}' ({}) was announced in {destination}, message {message_id}", offer.title, offer.id);
                    metrics::DELIVERIES_COUNTER.delivered.inc();
                    report.delivered.push((offer.id.clone(), destination));
                }
                Err(e) => {
                    log::warn!("couldn't announce {} in {destination} [{}]: {e}", offer.id, e.kind());
                    metrics::DELIVERIES_COUNTER.failed.inc();
                    report.failed.push((offer.id.clone(), destination, e));
                }
            }
        }

        self.status.set_state(LoopState::Committing);
        report.committed = self.commit(&report.delivered).await;
        self.finish(report)
    }

    async fn deliver_with_retries(&self, offer: &Offer, destination: &Destination) -> Result<Delivered, DeliveryError> {
        let retry = &self.config.retry;
        let mut attempt = 1;
        loop {
            match self.notifier.deliver(offer, destination).await {
                Ok(delivered) => return Ok(delivered),
                Err(e) if retry.should_retry(attempt, &e) => {
                    let delay = retry.delay(attempt);
                    log::warn!("attempt #{attempt} to announce {} in {destination} failed: {e}; retrying in {delay:?}", offer.id);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Records successful deliveries only. A failed write leaves the pair
    /// unseen, so it may be announced again.
    async fn commit(&self, delivered: &[(OfferId, Destination)]) -> usize {
        if delivered.is_empty() {
            return 0
        }
        let _guard = self.repos.write_guard().await;
        let announced_at = Utc::now();
        let mut committed = 0;
        for (offer_id, destination) in delivered {
            let record = SeenRecord {
                offer_id: offer_id.clone(),
                destination: *destination,
                announced_at,
            };
            match self.repos.seen.mark_seen(&record).await {
                Ok(_) => committed += 1,
                Err(e) => {
                    log::error!("couldn't record the announcement of {offer_id} in {destination}: {e}");
                    metrics::STORAGE_ERRORS_COUNTER.inc();
                }
            }
        }
        committed
    }

    fn interrupted(&self, report: &mut CycleReport) -> bool {
        if self.shutdown.is_triggered() && !report.interrupted {
            log::info!("shutdown requested, the rest of the cycle is postponed");
            report.interrupted = true;
        }
        report.interrupted
    }

    fn finish(&self, report: CycleReport) -> CycleReport {
        self.status.set_state(LoopState::Idle);
        let outcome = report.outcome();
        metrics::CYCLES_COUNTER.inc(outcome);
        log::info!("cycle {outcome}: fetched={}, pending={}, delivered={}, failed={}, committed={}, store_degraded={}",
            report.fetched, report.pending, report.delivered.len(), report.failed.len(),
            report.committed, report.store_degraded);
        report
    }
}
