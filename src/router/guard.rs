use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
  auth::{IdentityProvider, resolve_principal},
  models::users::UserProfile,
  router::{HOME_ROUTE, LOGIN_ROUTE, Route},
  store::database::{DocumentStore, USERS_COLLECTION, document_path},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
  Allowed,
  DeniedToLogin,
  DeniedToHome,
}

impl GuardDecision {
  /// Name of the route to redirect to, `None` when the navigation proceeds.
  pub fn redirect(&self) -> Option<&'static str> {
    match self {
      GuardDecision::Allowed => None,
      GuardDecision::DeniedToLogin => Some(LOGIN_ROUTE),
      GuardDecision::DeniedToHome => Some(HOME_ROUTE),
    }
  }
}

/// Runs before every route transition. Never fails: every problem ends in
/// a redirect.
#[derive(Debug)]
pub struct NavigationGuard {
  store: Arc<dyn DocumentStore>,
  identity: Arc<dyn IdentityProvider>,
}

impl NavigationGuard {
  pub fn new(store: Arc<dyn DocumentStore>, identity: Arc<dyn IdentityProvider>) -> Self {
    Self { store, identity }
  }

  pub async fn before_each(&self, to: &Route) -> GuardDecision {
    let requires_auth = to.requires_auth();
    let requires_admin = to.requires_admin();

    let principal = resolve_principal(self.identity.as_ref()).await;

    let Some(principal) = principal else {
      if requires_auth {
        debug!(route = %to.name, "not signed in, redirecting to login");
        return GuardDecision::DeniedToLogin;
      }
      if requires_admin {
        // no principal means the role cannot be confirmed
        debug!(route = %to.name, "no principal for an admin route, redirecting home");
        return GuardDecision::DeniedToHome;
      }
      return GuardDecision::Allowed;
    };

    if requires_admin && !self.is_admin(&principal.uid).await {
      debug!(route = %to.name, uid = %principal.uid, "not an admin, redirecting home");
      return GuardDecision::DeniedToHome;
    }

    GuardDecision::Allowed
  }

  // Any failure reads as "not an admin".
  async fn is_admin(&self, uid: &str) -> bool {
    let path = document_path(USERS_COLLECTION, uid);

    let doc = match self.store.get(USERS_COLLECTION, uid).await {
      Ok(Some(doc)) => doc,
      Ok(None) => {
        debug!(path = %path, "user profile not found");
        return false;
      }
      Err(err) => {
        warn!(path = %path, err = %err, "failed to fetch user role");
        return false;
      }
    };

    match UserProfile::from_document(doc, &path) {
      Ok(profile) => profile.is_admin(),
      Err(err) => {
        warn!(path = %path, err = %err, "failed to decode user profile");
        false
      }
    }
  }
}
