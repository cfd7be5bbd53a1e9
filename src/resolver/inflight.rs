//! In-flight lookup registry.
//!
//! Coalesces concurrent lookups for the same key: the first caller becomes
//! the leader and publishes its result on a watch channel, later callers
//! subscribe to that channel instead of starting their own lookup.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;

type Pending<V> = watch::Receiver<Option<V>>;

// == Claim ==
/// What a caller should do after registering interest in a key.
pub enum Claim<K: Hash + Eq + Clone, V: Clone> {
    /// The recheck closure produced a value; nothing to wait for
    Ready(V),
    /// Another caller is already looking the key up
    Wait(Pending<V>),
    /// This caller owns the lookup and must publish through the guard
    Lead(FlightGuard<K, V>, Pending<V>),
}

// == In-Flight Registry ==
#[derive(Debug)]
pub struct InFlight<K: Hash + Eq, V> {
    pending: DashMap<K, Pending<V>>,
}

impl<K, V> InFlight<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: DashMap::new(),
        })
    }

    /// Joins the pending lookup for `key` or claims leadership of a new one.
    ///
    /// `recheck` runs while the key's shard is locked, so a value published
    /// by a leader that finished between the caller's first cache read and
    /// this call is observed instead of starting a second lookup.
    pub fn claim(self: &Arc<Self>, key: &K, recheck: impl FnOnce() -> Option<V>) -> Claim<K, V> {
        match self.pending.entry(key.clone()) {
            Entry::Occupied(slot) => Claim::Wait(slot.get().clone()),
            Entry::Vacant(slot) => {
                if let Some(value) = recheck() {
                    return Claim::Ready(value);
                }
                let (tx, rx) = watch::channel(None);
                slot.insert(rx.clone());
                let guard = FlightGuard {
                    registry: Arc::clone(self),
                    key: key.clone(),
                    tx: Some(tx),
                };
                Claim::Lead(guard, rx)
            }
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// == Flight Guard ==
/// Leadership of one pending lookup.
///
/// Dropping the guard without calling [`FlightGuard::complete`] (for example
/// when the lookup task panics) unregisters the key and closes the channel,
/// so waiters wake with an error instead of hanging.
pub struct FlightGuard<K: Hash + Eq + Clone, V: Clone> {
    registry: Arc<InFlight<K, V>>,
    key: K,
    tx: Option<watch::Sender<Option<V>>>,
}

impl<K: Hash + Eq + Clone, V: Clone> FlightGuard<K, V> {
    /// Publishes `value` to every waiter and unregisters the key.
    pub fn complete(mut self, value: V) {
        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(value));
        }
    }
}

impl<K: Hash + Eq + Clone, V: Clone> Drop for FlightGuard<K, V> {
    fn drop(&mut self) {
        self.registry.pending.remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_claim_leads_second_waits() {
        let registry: Arc<InFlight<String, u32>> = InFlight::new();

        let Claim::Lead(guard, mut leader_rx) = registry.claim(&"k".to_string(), || None) else {
            panic!("first claim should lead");
        };
        let Claim::Wait(mut follower_rx) = registry.claim(&"k".to_string(), || None) else {
            panic!("second claim should wait");
        };
        assert_eq!(registry.len(), 1);

        guard.complete(7);

        assert_eq!(*leader_rx.wait_for(Option::is_some).await.unwrap(), Some(7));
        assert_eq!(*follower_rx.wait_for(Option::is_some).await.unwrap(), Some(7));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_recheck_short_circuits() {
        let registry: Arc<InFlight<String, u32>> = InFlight::new();

        let claim = registry.claim(&"k".to_string(), || Some(3));

        assert!(matches!(claim, Claim::Ready(3)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_recheck_skipped_when_pending() {
        let registry: Arc<InFlight<String, u32>> = InFlight::new();
        let _lead = registry.claim(&"k".to_string(), || None);

        let claim = registry.claim(&"k".to_string(), || panic!("must not recheck"));
        assert!(matches!(claim, Claim::Wait(_)));
    }

    #[tokio::test]
    async fn test_dropped_guard_wakes_waiters_with_error() {
        let registry: Arc<InFlight<String, u32>> = InFlight::new();

        let Claim::Lead(guard, _) = registry.claim(&"k".to_string(), || None) else {
            panic!("first claim should lead");
        };
        let Claim::Wait(mut rx) = registry.claim(&"k".to_string(), || None) else {
            panic!("second claim should wait");
        };

        drop(guard);

        assert!(rx.wait_for(Option::is_some).await.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_distinct_keys_do_not_share() {
        let registry: Arc<InFlight<String, u32>> = InFlight::new();

        let a = registry.claim(&"a".to_string(), || None);
        let b = registry.claim(&"b".to_string(), || None);

        assert!(matches!(a, Claim::Lead(..)));
        assert!(matches!(b, Claim::Lead(..)));
        assert_eq!(registry.len(), 2);
    }
}
