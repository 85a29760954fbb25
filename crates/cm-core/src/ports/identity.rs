use async_trait::async_trait;
use tokio::sync::watch;

use crate::{account::Identity, ports::errors::IdentityError};

/// Identity provider.
///
/// Sign-in itself is provider specific; the session only reads the current
/// identity and follows its changes.
#[async_trait]
pub trait IdentityPort: Send + Sync {
    /// The signed-in identity, if any.
    fn current(&self) -> Option<Identity>;

    /// Receiver that observes every sign-in / sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    async fn sign_out(&self) -> Result<(), IdentityError>;
}
