pub mod guard;

pub const HOME_ROUTE: &str = "home";
pub const LOGIN_ROUTE: &str = "login";

/// Requirements declared by one route record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
  pub requires_auth: bool,
  pub requires_admin: bool,
}

impl RouteMeta {
  pub fn public() -> Self {
    Self::default()
  }

  pub fn authenticated() -> Self {
    Self { requires_auth: true, requires_admin: false }
  }

  pub fn admin() -> Self {
    Self { requires_auth: true, requires_admin: true }
  }
}

/// A navigation target with every record it matched (parents first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
  pub name: String,
  pub matched: Vec<RouteMeta>,
}

impl Route {
  pub fn new(name: impl Into<String>, matched: Vec<RouteMeta>) -> Self {
    Self { name: name.into(), matched }
  }

  pub fn requires_auth(&self) -> bool {
    self.matched.iter().any(|m| m.requires_auth)
  }

  pub fn requires_admin(&self) -> bool {
    self.matched.iter().any(|m| m.requires_admin)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn any_matched_record_sets_a_requirement() {
    let route = Route::new("settings", vec![RouteMeta::public(), RouteMeta::authenticated()]);
    assert!(route.requires_auth());
    assert!(!route.requires_admin());

    let route = Route::new("home", vec![]);
    assert!(!route.requires_auth());
  }
}
