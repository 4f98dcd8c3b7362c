use std::collections::HashSet;
use serenity::model::id::ChannelId;
use crate::domain::{Destination, Offer, OfferId};
use crate::{metrics, repo};

/// What the seen-store knew about the current catalog when a cycle began.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeenSnapshot {
    pairs: HashSet<(OfferId, ChannelId)>,
    degraded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelivery<'a> {
    pub offer: &'a Offer,
    pub destination: Destination,
}

impl SeenSnapshot {
    /// Falls back to an empty snapshot if the store cannot be read: a
    /// duplicate announcement is preferred over a lost one.
    pub async fn load(store: &repo::SeenOffers, offers: &[Offer], destinations: &[Destination]) -> Self {
        let mut pairs = HashSet::new();
        for offer in offers {
            for destination in destinations {
                match store.has_seen(&offer.id, destination).await {
                    Ok(true) => {
                        pairs.insert((offer.id.clone(), destination.channel_id));
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log::error!("{e}; every offer is treated as unseen in this cycle");
                        metrics::STORAGE_ERRORS_COUNTER.inc();
                        return Self::degraded()
                    }
                }
            }
        }
        Self { pairs, degraded: false }
    }

    pub fn degraded() -> Self {
        Self { pairs: HashSet::new(), degraded: true }
    }

    pub fn contains(&self, offer_id: &OfferId, destination: &Destination) -> bool {
        self.pairs.contains(&(offer_id.clone(), destination.channel_id))
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

#[cfg(test)]
impl FromIterator<(OfferId, Destination)> for SeenSnapshot {
    fn from_iter<T: IntoIterator<Item = (OfferId, Destination)>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter()
                .map(|(offer_id, destination)| (offer_id, destination.channel_id))
                .collect(),
            degraded: false,
        }
    }
}

/// Selects the (offer, destination) pairs that haven't been announced yet.
/// Offers keep the catalog order, destinations keep the registration order.
pub fn pending_deliveries<'a>(offers: &'a [Offer], destinations: &[Destination], seen: &SeenSnapshot) -> Vec<PendingDelivery<'a>> {
    offers.iter()
        .flat_map(|offer| destinations.iter()
            .filter(move |destination| !seen.contains(&offer.id, destination))
            .map(move |destination| PendingDelivery { offer, destination: *destination }))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repo::test::destination;

    fn pairs(pending: &[PendingDelivery]) -> Vec<(String, u64)> {
        pending.iter()
            .map(|p| (p.offer.id.to_string(), p.destination.channel_id.get()))
            .collect()
    }

    #[test]
    fn test_single_offer_single_destination() {
        let offers = vec![Offer::stub("A", "Game A")];
        let destinations = vec![destination(1, 10)];

        let pending = pending_deliveries(&offers, &destinations, &SeenSnapshot::default());
        assert_eq!(pairs(&pending), vec![("A".to_owned(), 10)]);

        let seen = SeenSnapshot::from_iter([(OfferId::new("A"), destination(1, 10))]);
        assert!(pending_deliveries(&offers, &destinations, &seen).is_empty());
    }

    #[test]
    fn test_order_and_filtering() {
        let offers = vec![Offer::stub("B", "Game B"), Offer::stub("A", "Game A")];
        let destinations = vec![destination(3, 30), destination(1, 10)];
        let seen = SeenSnapshot::from_iter([(OfferId::new("A"), destination(3, 30))]);

        let pending = pending_deliveries(&offers, &destinations, &seen);
        assert_eq!(pairs(&pending), vec![
            ("B".to_owned(), 30),
            ("B".to_owned(), 10),
            ("A".to_owned(), 10),
        ]);
    }

    #[test]
    fn test_idempotent() {
        let offers = vec![Offer::stub("A", "Game A"), Offer::stub("B", "Game B")];
        let destinations = vec![destination(1, 10), destination(2, 20)];
        let seen = SeenSnapshot::from_iter([(OfferId::new("B"), destination(2, 20))]);

        let first = pending_deliveries(&offers, &destinations, &seen);
        let second = pending_deliveries(&offers, &destinations, &seen);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_no_offers_or_destinations() {
        let offers = vec![Offer::stub("A", "Game A")];
        assert!(pending_deliveries(&[], &[destination(1, 10)], &SeenSnapshot::default()).is_empty());
        assert!(pending_deliveries(&offers, &[], &SeenSnapshot::default()).is_empty());
    }

    #[tokio::test]
    async fn test_load_degrades_on_storage_failure() {
        let db = repo::test::start_sqlite().await;
        let store = repo::SeenOffers::new(db.clone());
        let offers = vec![Offer::stub("A", "Game A")];
        let destinations = vec![destination(1, 10)];

        let snapshot = SeenSnapshot::load(&store, &offers, &destinations).await;
        assert!(!snapshot.is_degraded());

        db.close().await;
        let snapshot = SeenSnapshot::load(&store, &offers, &destinations).await;
        assert!(snapshot.is_degraded());
        assert_eq!(pending_deliveries(&offers, &destinations, &snapshot).len(), 1);
    }
}
