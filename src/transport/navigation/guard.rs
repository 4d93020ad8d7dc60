use crate::storage::AuthProvider;
use crate::transport::navigation::routes::{RouteDef, LOGIN};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of the guard for one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    /// Go to the named route instead.
    Redirect(&'static str),
}

/// Checks for an active session before entering a route that requires one.
///
/// The session is looked up on every call; nothing is cached between transitions.
#[derive(Clone)]
pub struct NavigationGuard {
    auth: Arc<dyn AuthProvider>,
}

impl NavigationGuard {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    pub async fn check(&self, route: &RouteDef) -> GuardDecision {
        if !route.requires_auth {
            return GuardDecision::Proceed;
        }
        match self.auth.current_session().await {
            Ok(Some(_)) => GuardDecision::Proceed,
            Ok(None) => {
                debug!(route = route.name, "no active session");
                GuardDecision::Redirect(LOGIN)
            }
            Err(e) => {
                warn!(route = route.name, error = %e, "session lookup failed");
                GuardDecision::Redirect(LOGIN)
            }
        }
    }
}
