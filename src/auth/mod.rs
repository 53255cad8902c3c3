mod identity;

pub use identity::{AuthState, IdentityHub, IdentityProvider, Principal, resolve_principal};
