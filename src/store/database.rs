pub mod dbstore;
pub mod errors;

use std::fmt;

use serde_json::{Map, Value};
use tokio::{sync::mpsc, task::AbortHandle};

use crate::store::database::errors::DBError;

pub const PRODUCTS_COLLECTION: &str = "products";
pub const USERS_COLLECTION: &str = "users";
pub const REVIEWS_ORDER_FIELD: &str = "createdAt";

pub fn reviews_collection(product_id: &str) -> String {
  format!("{}/{}/reviews", PRODUCTS_COLLECTION, product_id)
}

pub fn document_path(collection: &str, id: &str) -> String {
  format!("{}/{}", collection, id)
}

pub type DocumentData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id: String,
  pub data: DocumentData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Asc,
  Desc,
}

/// A collection query for live subscriptions.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
  pub collection: String,
  pub order_by: Option<(String, Direction)>,
}

impl Query {
  pub fn collection(collection: impl Into<String>) -> Self {
    Self { collection: collection.into(), order_by: None }
  }

  pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
    self.order_by = Some((field.into(), direction));
    self
  }
}

pub type Snapshot = Result<Vec<Document>, DBError>;

/// The receiving side of a live query. Every item is either the full,
/// freshly ordered result set or an error raised on the channel; errors do
/// not close it. Dropping the value detaches from the store.
pub struct LiveQuery {
  rx: mpsc::UnboundedReceiver<Snapshot>,
  task: Option<AbortHandle>,
}

impl LiveQuery {
  pub fn new(rx: mpsc::UnboundedReceiver<Snapshot>, task: Option<AbortHandle>) -> Self {
    Self { rx, task }
  }

  /// Waits for the next delivery. `None` once the store side has gone away.
  pub async fn next(&mut self) -> Option<Snapshot> {
    self.rx.recv().await
  }
}

impl fmt::Debug for LiveQuery {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("LiveQuery").field("closed", &self.rx.is_closed()).finish()
  }
}

impl Drop for LiveQuery {
  fn drop(&mut self) {
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

/// A schemaless document database addressed by collection paths
/// (`products`, `products/{id}/reviews`, `users`).
#[async_trait::async_trait]
pub trait DocumentStore: fmt::Debug + Send + Sync {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DBError>;

  /// All documents of a collection in the store's natural order.
  async fn list(&self, collection: &str) -> Result<Vec<Document>, DBError>;

  /// Inserts a document under a store-generated id and returns that id.
  async fn add(&self, collection: &str, data: DocumentData) -> Result<String, DBError>;

  /// Merges `data` into an existing document. Fields not present in `data`
  /// are left untouched. Fails with `NotFound` if the document is missing.
  async fn update(&self, collection: &str, id: &str, data: DocumentData) -> Result<(), DBError>;

  /// Creates or fully replaces a document under a caller-chosen id.
  async fn set(&self, collection: &str, id: &str, data: DocumentData) -> Result<(), DBError>;

  async fn delete(&self, collection: &str, id: &str) -> Result<(), DBError>;

  /// Opens a live query. The current result set is delivered first, then a
  /// fresh one after every change to the collection.
  async fn watch(&self, query: Query) -> Result<LiveQuery, DBError>;
}
