use crate::client::ApiError;
use crate::session::SessionStore;
use crate::view::FleetView;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reacts to authentication failures from any endpoint.
///
/// Expires the session store and asks the view to re-authenticate. Only the
/// first failure after a login fires; later ones find the store already
/// expired and do nothing.
pub struct SessionGuard {
    session: Arc<SessionStore>,
    view: Arc<dyn FleetView>,
}

impl SessionGuard {
    pub fn new(session: Arc<SessionStore>, view: Arc<dyn FleetView>) -> Self {
        Self { session, view }
    }

    /// Handle an auth failure. Returns true if the re-authenticate signal fired.
    pub fn handle_auth_failure(&self) -> bool {
        if self.session.expire() {
            warn!("Backend rejected session credential, forcing re-authentication");
            self.view.on_auth_required();
            true
        } else {
            debug!("Session already expired, ignoring repeated auth failure");
            false
        }
    }

    /// Route an `Auth` outcome to [`handle_auth_failure`](Self::handle_auth_failure)
    /// and pass the result through unchanged
    pub fn observe<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(ApiError::Auth(_)) = &result {
            self.handle_auth_failure();
        }
        result
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }
}
