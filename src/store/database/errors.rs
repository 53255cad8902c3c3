use sqlx::error::Error as SqlxError;
use sqlx::postgres::PgDatabaseError;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DBErrorType {
  NotFound,
  JsonMarshal,
  JsonUnmarshal,
  Connection,
  Unavailable,
  Privileges,
  Internal,
}

impl fmt::Display for DBErrorType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DBErrorType::NotFound => write!(f, "not_found"),
      DBErrorType::JsonMarshal => write!(f, "json_marshal"),
      DBErrorType::JsonUnmarshal => write!(f, "json_unmarshal"),
      DBErrorType::Connection => write!(f, "connection_exception"),
      DBErrorType::Unavailable => write!(f, "unavailable"),
      DBErrorType::Privileges => write!(f, "insufficient_privilege"),
      DBErrorType::Internal => write!(f, "internal_error"),
    }
  }
}

#[derive(Debug)]
pub struct DBError {
  pub err_type: DBErrorType,
  pub err: Option<Box<dyn Error + Send + Sync>>,
  pub msg: String,
  pub path: String,
  pub details: String,
}

impl fmt::Display for DBError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut parts = Vec::new();

    if !self.path.is_empty() {
      parts.push(format!("path: {}", self.path));
    }

    parts.push(format!("err_type: {}", self.err_type));

    if !self.msg.is_empty() {
      parts.push(format!("msg: {}", self.msg));
    }

    if !self.details.is_empty() {
      parts.push(format!("details: {}", self.details));
    }

    if let Some(ref err) = self.err {
      parts.push(format!("err: {}", err));
    }

    write!(f, "{}", parts.join(", "))
  }
}

impl Error for DBError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    self.err.as_ref().map(|e| &**e as &dyn Error)
  }
}

impl DBError {
  pub fn new(
    err_type: DBErrorType,
    err: Option<Box<dyn Error + Send + Sync>>,
    msg: impl Into<String>,
    path: impl Into<String>,
    details: impl Into<String>,
  ) -> Self {
    Self { err_type, err, msg: msg.into(), path: path.into(), details: details.into() }
  }

  pub fn not_found(path: impl Into<String>) -> Self {
    Self::new(DBErrorType::NotFound, None, "the requested document is not found", path, "")
  }

  pub fn json_unmarshal(err: serde_json::Error, path: impl Into<String>) -> Self {
    Self::new(
      DBErrorType::JsonUnmarshal,
      Some(Box::new(err)),
      "failed to decode the document",
      path,
      "",
    )
  }

  pub fn json_marshal(err: serde_json::Error, path: impl Into<String>) -> Self {
    Self::new(
      DBErrorType::JsonMarshal,
      Some(Box::new(err)),
      "failed to encode the document",
      path,
      "",
    )
  }
}

pub fn handle_db_error(err: SqlxError, path: &str) -> DBError {
  match err {
    SqlxError::Database(db_err) => {
      let (code, details) = match db_err.try_downcast_ref::<PgDatabaseError>() {
        Some(pg_err) => (pg_err.code().to_string(), pg_err.detail().unwrap_or("").to_string()),
        None => (db_err.code().map(|c| c.to_string()).unwrap_or_default(), String::new()),
      };

      let (err_type, msg) = match code.as_str() {
        // Connection/availability errors
        "08000" | "08003" | "08006" => {
          (DBErrorType::Connection, "database connection exception")
        }
        "57P01" | "57P03" => (DBErrorType::Unavailable, "database is shutting down"),
        // Permission errors
        "42501" => (DBErrorType::Privileges, "insufficient permissions to perform an action"),
        _ => (DBErrorType::Internal, "database error"),
      };

      DBError::new(err_type, Some(Box::new(SqlxError::Database(db_err))), msg, path, details)
    }

    SqlxError::RowNotFound => DBError::new(
      DBErrorType::NotFound,
      Some(Box::new(SqlxError::RowNotFound)),
      "the requested document is not found",
      path,
      "",
    ),

    SqlxError::Io(_) | SqlxError::Tls(_) | SqlxError::PoolTimedOut | SqlxError::PoolClosed => {
      DBError::new(
        DBErrorType::Connection,
        Some(Box::new(err)),
        "database connection exception",
        path,
        "",
      )
    }

    _ => DBError::new(DBErrorType::Internal, Some(Box::new(err)), "database error", path, ""),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_lists_the_populated_parts() {
    let err = DBError::new(DBErrorType::Connection, None, "store unavailable", "products", "");
    assert_eq!(
      err.to_string(),
      "path: products, err_type: connection_exception, msg: store unavailable"
    );
  }

  #[test]
  fn row_not_found_maps_to_not_found() {
    let err = handle_db_error(SqlxError::RowNotFound, "products/1");
    assert_eq!(err.err_type, DBErrorType::NotFound);
    assert_eq!(err.path, "products/1");
  }

  #[test]
  fn closed_pool_maps_to_connection() {
    let err = handle_db_error(SqlxError::PoolClosed, "products");
    assert_eq!(err.err_type, DBErrorType::Connection);
    assert!(err.source().is_some());
  }
}
