use serde::Deserialize;
use serde_json::{Value, from_value};

use crate::store::database::{Document, errors::DBError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  User,
  #[serde(other)]
  Unknown,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::User => "user",
      Role::Unknown => "unknown",
    }
  }
}

/// The `users/{uid}` profile written when an account is provisioned.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub profile_picture: Option<String>,
  pub role: Role,
}

impl UserProfile {
  pub fn from_document(doc: Document, path: &str) -> Result<Self, DBError> {
    from_value(Value::Object(doc.data)).map_err(|err| DBError::json_unmarshal(err, path))
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}
