use std::fmt;

use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
  pub uid: String,
  pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
  /// The provider has not reported yet.
  #[default]
  Pending,
  SignedOut,
  SignedIn(Principal),
}

impl AuthState {
  pub fn is_resolved(&self) -> bool {
    !matches!(self, AuthState::Pending)
  }

  pub fn principal(&self) -> Option<&Principal> {
    match self {
      AuthState::SignedIn(p) => Some(p),
      _ => None,
    }
  }
}

/// Source of the current identity. Every receiver observes the latest
/// state and every later change.
pub trait IdentityProvider: fmt::Debug + Send + Sync {
  fn auth_state(&self) -> watch::Receiver<AuthState>;
}

/// Waits for the provider's first resolved notification. A provider that
/// goes away before reporting counts as signed out.
pub async fn resolve_principal(provider: &dyn IdentityProvider) -> Option<Principal> {
  let mut rx = provider.auth_state();
  let principal = match rx.wait_for(AuthState::is_resolved).await {
    Ok(state) => state.principal().cloned(),
    Err(_) => {
      debug!("identity provider closed before resolving");
      None
    }
  };
  principal
}

/// In-process identity provider driven by explicit sign-in/sign-out calls.
#[derive(Debug)]
pub struct IdentityHub {
  tx: watch::Sender<AuthState>,
}

impl Default for IdentityHub {
  fn default() -> Self {
    Self::new()
  }
}

impl IdentityHub {
  /// Starts unresolved, so resolutions wait for the first sign-in/out.
  pub fn new() -> Self {
    let (tx, _) = watch::channel(AuthState::Pending);
    Self { tx }
  }

  pub fn signed_out() -> Self {
    let (tx, _) = watch::channel(AuthState::SignedOut);
    Self { tx }
  }

  pub fn sign_in(&self, principal: Principal) {
    debug!(uid = %principal.uid, "signed in");
    self.tx.send_replace(AuthState::SignedIn(principal));
  }

  pub fn sign_out(&self) {
    debug!("signed out");
    self.tx.send_replace(AuthState::SignedOut);
  }

  pub fn current(&self) -> AuthState {
    self.tx.borrow().clone()
  }
}

impl IdentityProvider for IdentityHub {
  fn auth_state(&self) -> watch::Receiver<AuthState> {
    self.tx.subscribe()
  }
}
