//! Registration handles returned by the bus.
//!
//! A [`Registration`] revokes exactly one register call. Revocation runs at
//! most once however many times `unregister` is called, and stays safe after
//! the owning mapping was already removed by other means.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::BoxFuture;

type Revoke = Box<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Handle to one listener registration.
pub struct Registration {
    revoked: AtomicBool,
    revoke: Revoke,
}

impl Registration {
    pub(crate) fn new(revoke: Revoke) -> Self {
        Self {
            revoked: AtomicBool::new(false),
            revoke,
        }
    }

    /// Removes the registration from its pool.
    ///
    /// Idempotent: the first call revokes, every later call is a no-op.
    pub async fn unregister(&self) {
        if !self.revoked.swap(true, Ordering::SeqCst) {
            (self.revoke)().await;
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("revoked", &self.revoked.load(Ordering::SeqCst))
            .finish()
    }
}
