use std::sync::{Mutex, PoisonError};

use cm_core::{SavedRecipeDocument, UserId};
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Snapshots queued per subscriber. Anything published while the queue is
/// full is coalesced into the latest value.
const CHANNEL_CAPACITY: usize = 1;

type Snapshot = Vec<SavedRecipeDocument>;

struct Subscriber {
    owner: UserId,
    latest: watch::Sender<Snapshot>,
    outbox: mpsc::Sender<Snapshot>,
}

/// Live subscriptions, keyed by owner.
///
/// Each subscriber has a forwarding task that moves the newest published
/// snapshot into its channel, so a slow reader skips stale snapshots
/// instead of losing the latest one.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl SubscriberRegistry {
    /// Register a subscriber and hand it `initial` as its first snapshot.
    ///
    /// Must be called inside a tokio runtime.
    pub(crate) fn subscribe(&self, owner: &UserId, initial: Snapshot) -> mpsc::Receiver<Snapshot> {
        let (outbox, rx) = mpsc::channel(CHANNEL_CAPACITY);
        // Fresh channel with spare capacity: cannot fail.
        let _ = outbox.try_send(initial.clone());
        let (latest, latest_rx) = watch::channel(initial);
        tokio::spawn(forward(latest_rx, outbox.clone()));
        self.lock().push(Subscriber {
            owner: owner.clone(),
            latest,
            outbox,
        });
        rx
    }

    /// Make `snapshot` the newest value for every live subscriber of `owner`,
    /// dropping closed ones.
    pub(crate) fn publish(&self, owner: &UserId, snapshot: &Snapshot) {
        let mut subscribers = self.lock();
        subscribers.retain(|s| !s.outbox.is_closed());
        for subscriber in subscribers.iter().filter(|s| &s.owner == owner) {
            subscriber.latest.send_replace(snapshot.clone());
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.lock().iter().filter(|s| !s.outbox.is_closed()).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn forward(mut latest: watch::Receiver<Snapshot>, outbox: mpsc::Sender<Snapshot>) {
    loop {
        tokio::select! {
            changed = latest.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = outbox.closed() => break,
        }
        let snapshot = latest.borrow_and_update().clone();
        if outbox.send(snapshot).await.is_err() {
            break;
        }
    }
    debug!("saved recipes subscriber gone");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cm_core::{DocId, Recipe};
    use std::time::Duration;

    fn snapshot(len: usize) -> Snapshot {
        (0..len)
            .map(|i| {
                let recipe: Recipe =
                    serde_json::from_value(serde_json::json!({ "id": i.to_string(), "title": "Soup" }))
                        .unwrap();
                SavedRecipeDocument {
                    doc_id: DocId::from(format!("d{i}")),
                    user_id: UserId::from("alice"),
                    created_at: Utc::now(),
                    recipe,
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn slow_reader_still_receives_the_newest_snapshot() {
        let registry = SubscriberRegistry::default();
        let alice = UserId::from("alice");
        let mut rx = registry.subscribe(&alice, snapshot(0));

        for len in 1..=20 {
            registry.publish(&alice, &snapshot(len));
        }

        let mut seen = Vec::new();
        while let Ok(Some(snap)) = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await {
            seen.push(snap.len());
            if snap.len() == 20 {
                break;
            }
        }
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&20));
    }

    #[tokio::test]
    async fn other_owners_are_not_notified() {
        let registry = SubscriberRegistry::default();
        let mut rx = registry.subscribe(&UserId::from("alice"), snapshot(1));
        assert_eq!(rx.recv().await.unwrap().len(), 1);

        registry.publish(&UserId::from("bob"), &snapshot(3));

        assert!(tokio::time::timeout(Duration::from_millis(50), rx.recv())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn closed_receivers_are_pruned_on_publish() {
        let registry = SubscriberRegistry::default();
        let alice = UserId::from("alice");
        let rx = registry.subscribe(&alice, snapshot(0));
        assert_eq!(registry.live_count(), 1);

        drop(rx);
        registry.publish(&alice, &snapshot(1));

        assert_eq!(registry.live_count(), 0);
        assert!(registry.lock().is_empty());
    }
}
