use keepup_models::UserIdentity;
use tokio::sync::watch;
use tracing::info;

/// Source of the signed-in identity.
///
/// Real sign-in flows (email links, OAuth) live outside the app core; they
/// hand the resulting identity to `sign_in`.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;

    fn sign_in(&self, identity: UserIdentity);

    fn sign_out(&self);

    /// Receiver that observes every auth-state change
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;
}

/// Session-scoped auth state held in a `watch` channel
pub struct SessionAuth {
    state: watch::Sender<Option<UserIdentity>>,
}

impl SessionAuth {
    pub fn new() -> Self {
        Self::with_user(None)
    }

    pub fn with_user(user: Option<UserIdentity>) -> Self {
        let (state, _) = watch::channel(user);
        Self { state }
    }
}

impl Default for SessionAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthProvider for SessionAuth {
    fn current_user(&self) -> Option<UserIdentity> {
        self.state.borrow().clone()
    }

    fn sign_in(&self, identity: UserIdentity) {
        info!("Signed in as {}", identity.user_id);
        self.state.send_replace(Some(identity));
    }

    fn sign_out(&self) {
        if self.state.send_replace(None).is_some() {
            info!("Signed out");
        }
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.state.subscribe()
    }
}
