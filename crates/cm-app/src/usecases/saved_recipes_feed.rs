use std::sync::Arc;

use cm_core::ports::{IdentityPort, RecipeRepositoryPort};
use cm_core::{Identity, SavedRecipeDocument};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::events::SessionEvent;
use crate::stores::RecipeCollection;

/// Live view of the signed-in user's saved recipes.
///
/// A background task pushes every store snapshot into the
/// [`RecipeCollection`] and follows sign-in / sign-out. Dropping the feed
/// stops the task and with it the store subscription.
pub struct SavedRecipesFeed {
    task: JoinHandle<()>,
}

enum Wake {
    IdentityChanged,
    IdentityClosed,
    Snapshot(Option<Vec<SavedRecipeDocument>>),
}

impl SavedRecipesFeed {
    /// Start following the identity provider. Requires a tokio runtime.
    pub fn start(
        repo: Arc<dyn RecipeRepositoryPort>,
        identity: Arc<dyn IdentityPort>,
        collection: Arc<RecipeCollection>,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        let identity_rx = identity.subscribe();
        let task = tokio::spawn(
            run(repo, identity_rx, collection, events).instrument(info_span!("saved_recipes_feed")),
        );
        Self { task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SavedRecipesFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn next_snapshot(
    snapshots: &mut Option<mpsc::Receiver<Vec<SavedRecipeDocument>>>,
) -> Option<Vec<SavedRecipeDocument>> {
    match snapshots {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run(
    repo: Arc<dyn RecipeRepositoryPort>,
    mut identity_rx: watch::Receiver<Option<Identity>>,
    collection: Arc<RecipeCollection>,
    events: broadcast::Sender<SessionEvent>,
) {
    loop {
        let current = identity_rx.borrow_and_update().clone();

        let mut snapshots = match &current {
            Some(identity) => match repo.subscribe(&identity.user_id).await {
                Ok(rx) => {
                    info!(user_id = %identity.user_id, "subscribed to saved recipes");
                    Some(rx)
                }
                Err(err) => {
                    warn!(error = %err, "saved recipes subscription failed");
                    None
                }
            },
            None => {
                collection.clear().await;
                let _ = events.send(SessionEvent::SavedRecipesChanged { count: 0 });
                None
            }
        };

        loop {
            let wake = tokio::select! {
                changed = identity_rx.changed() => match changed {
                    Ok(()) => Wake::IdentityChanged,
                    Err(_) => Wake::IdentityClosed,
                },
                snapshot = next_snapshot(&mut snapshots) => Wake::Snapshot(snapshot),
            };

            match wake {
                Wake::Snapshot(Some(docs)) => {
                    let count = collection.apply_snapshot(docs).await;
                    debug!(count, "saved recipes snapshot applied");
                    let _ = events.send(SessionEvent::SavedRecipesChanged { count });
                }
                Wake::Snapshot(None) => {
                    // Store side closed; wait for the next identity change.
                    warn!("saved recipes subscription closed by the store");
                    snapshots = None;
                }
                Wake::IdentityChanged => {
                    let signed_out = current.is_some() && identity_rx.borrow().is_none();
                    if signed_out {
                        info!("signed out, clearing saved recipes");
                        let _ = events.send(SessionEvent::SignInRequired);
                    }
                    break;
                }
                Wake::IdentityClosed => {
                    debug!("identity provider gone, stopping feed");
                    return;
                }
            }
        }
    }
}
