use std::error::Error;

use derive_more::Display;
use thiserror::Error as ThisError;

use crate::store::database::errors::{DBError, DBErrorType};

pub type BoxedErr = Box<dyn Error + Send + Sync>;

#[derive(Debug, Display)]
#[display("InternalError: {} {} {} {}", temp, err, msg, path)]
pub struct InternalError {
  pub temp: bool,
  pub err: BoxedErr,
  pub msg: String,
  pub path: String,
}

impl Error for InternalError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    Some(&*self.err)
  }
}

/// Failures surfaced by the storefront components to their callers.
#[derive(Debug, ThisError)]
pub enum StoreError {
  #[error("failed to read from the document store: {0}")]
  Read(#[source] DBError),

  #[error("failed to write to the document store: {0}")]
  Write(#[source] DBError),

  #[error("the requested document is not found: {path}")]
  NotFound { path: String },

  /// Delivered on an open live query. Logged by the subscription owner,
  /// never returned from a read or write.
  #[error("live query failed: {0}")]
  Subscription(#[source] DBError),

  /// The write went through (`id` is the written document) but the list
  /// refresh that follows it did not.
  #[error("document {id} was written but the product list refresh failed: {source}")]
  Refresh {
    id: String,
    #[source]
    source: Box<StoreError>,
  },

  #[error("invalid {field}: {msg}")]
  Validation { field: &'static str, msg: String },
}

impl StoreError {
  pub fn read(err: DBError) -> Self {
    match err.err_type {
      DBErrorType::NotFound => StoreError::NotFound { path: err.path },
      _ => StoreError::Read(err),
    }
  }

  pub fn write(err: DBError) -> Self {
    match err.err_type {
      DBErrorType::NotFound => StoreError::NotFound { path: err.path },
      _ => StoreError::Write(err),
    }
  }

  pub fn validation(field: &'static str, msg: impl Into<String>) -> Self {
    StoreError::Validation { field, msg: msg.into() }
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, StoreError::NotFound { .. })
  }

  /// The id of a document that was persisted even though the call failed.
  pub fn written_id(&self) -> Option<&str> {
    match self {
      StoreError::Refresh { id, .. } => Some(id),
      _ => None,
    }
  }
}
