use std::sync::{Arc, RwLock};
use chrono::{DateTime, Utc};
use crate::domain::{Offer, OfferKind};

const LOOP_STATUS_POISONED_MSG: &str = "LoopStatus lock was poisoned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum LoopState {
    Idle,
    Fetching,
    Deduplicating,
    Delivering,
    Committing,
    Shutdown,
}

#[derive(Debug, Clone)]
struct Inner {
    state: LoopState,
    catalog: Vec<Offer>,
    fetched_at: Option<DateTime<Utc>>,
    next_cycle_at: Option<DateTime<Utc>>,
}

/// What the polling loop is doing and what it saw last; read by commands.
#[derive(Clone)]
pub struct LoopStatus {
    inner: Arc<RwLock<Inner>>,
}

impl Default for LoopStatus {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                state: LoopState::Idle,
                catalog: Vec::new(),
                fetched_at: None,
                next_cycle_at: None,
            }))
        }
    }
}

impl LoopStatus {
    pub fn state(&self) -> LoopState {
        self.read().state
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.read().fetched_at
    }

    pub fn next_cycle_at(&self) -> Option<DateTime<Utc>> {
        self.read().next_cycle_at
    }

    pub fn offers(&self, kind: OfferKind) -> Vec<Offer> {
        self.read().catalog.iter()
            .filter(|offer| offer.kind == kind)
            .cloned()
            .collect()
    }

    pub(crate) fn set_state(&self, state: LoopState) {
        let previous = std::mem::replace(&mut self.write().state, state);
        if previous != state {
            log::debug!("polling loop: {previous} -> {state}");
        }
    }

    pub(crate) fn set_catalog(&self, catalog: Vec<Offer>, fetched_at: DateTime<Utc>) {
        let mut inner = self.write();
        inner.catalog = catalog;
        inner.fetched_at = Some(fetched_at);
    }

    pub(crate) fn set_next_cycle_at(&self, next_cycle_at: Option<DateTime<Utc>>) {
        self.write().next_cycle_at = next_cycle_at;
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect(LOOP_STATUS_POISONED_MSG)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect(LOOP_STATUS_POISONED_MSG)
    }
}
