use async_trait::async_trait;
use cm_core::ports::{IdentityError, IdentityPort};
use cm_core::Identity;
use tokio::sync::watch;
use tracing::info;

/// Identity provider for a single local user.
///
/// There is no credential check: whoever runs the process decides who is
/// signed in. Changes are broadcast to every subscriber.
pub struct LocalIdentityProvider {
    current: watch::Sender<Option<Identity>>,
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl LocalIdentityProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        let (current, _) = watch::channel(initial);
        Self { current }
    }

    pub fn sign_in(&self, identity: Identity) {
        info!(user_id = %identity.user_id, "signed in");
        self.current.send_replace(Some(identity));
    }
}

#[async_trait]
impl IdentityPort for LocalIdentityProvider {
    fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        if let Some(previous) = self.current.send_replace(None) {
            info!(user_id = %previous.user_id, "signed out");
        }
        Ok(())
    }
}
