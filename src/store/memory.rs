use std::{
  cmp::Ordering,
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
};

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedSender};
use ulid::Ulid;

use crate::store::database::{
  Direction, Document, DocumentData, DocumentStore, LiveQuery, Query, Snapshot, document_path,
  errors::{DBError, DBErrorType},
};

/// In-process document store. Ids are generated client-side, collections
/// keep insertion order and live queries are fed synchronously on every
/// write. Reads and writes can be switched to failing to exercise the error
/// paths of the callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
  collections: HashMap<String, Vec<Document>>,
  watchers: Vec<Watcher>,
  fail_reads: bool,
  fail_writes: bool,
}

#[derive(Debug)]
struct Watcher {
  query: Query,
  tx: UnboundedSender<Snapshot>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_fail_reads(&self, fail: bool) {
    self.lock().fail_reads = fail;
  }

  pub fn set_fail_writes(&self, fail: bool) {
    self.lock().fail_writes = fail;
  }

  /// Delivers an error to every open live query on `collection`.
  pub fn push_error(&self, collection: &str) {
    let mut inner = self.lock();
    inner.watchers.retain(|w| {
      if w.query.collection != collection {
        return true;
      }
      w.tx.send(Err(unavailable(collection))).is_ok()
    });
  }

  /// Number of live queries still attached to `collection`.
  pub fn watcher_count(&self, collection: &str) -> usize {
    let mut inner = self.lock();
    inner.watchers.retain(|w| !w.tx.is_closed());
    inner.watchers.iter().filter(|w| w.query.collection == collection).count()
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn unavailable(path: &str) -> DBError {
  DBError::new(DBErrorType::Unavailable, None, "the document store is unavailable", path, "")
}

impl Inner {
  fn check_read(&self, path: &str) -> Result<(), DBError> {
    if self.fail_reads { Err(unavailable(path)) } else { Ok(()) }
  }

  fn check_write(&self, path: &str) -> Result<(), DBError> {
    if self.fail_writes { Err(unavailable(path)) } else { Ok(()) }
  }

  fn notify(&mut self, collection: &str) {
    let Inner { collections, watchers, .. } = self;
    watchers.retain(|w| {
      if w.query.collection != collection {
        return !w.tx.is_closed();
      }
      w.tx.send(Ok(run_query(collections, &w.query))).is_ok()
    });
  }
}

fn run_query(collections: &HashMap<String, Vec<Document>>, query: &Query) -> Vec<Document> {
  let mut docs = collections.get(&query.collection).cloned().unwrap_or_default();

  if let Some((field, direction)) = &query.order_by {
    // documents without the ordering field are not part of an ordered result
    docs.retain(|d| d.data.contains_key(field));
    docs.sort_by(|a, b| {
      let ord = compare_values(&a.data[field.as_str()], &b.data[field.as_str()]);
      match direction {
        Direction::Asc => ord,
        Direction::Desc => ord.reverse(),
      }
    });
  }

  docs
}

fn type_rank(v: &Value) -> u8 {
  match v {
    Value::Null => 0,
    Value::Bool(_) => 1,
    Value::Number(_) => 2,
    Value::String(_) => 3,
    Value::Array(_) => 4,
    Value::Object(_) => 5,
  }
}

pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => {
      let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
      x.partial_cmp(&y).unwrap_or(Ordering::Equal)
    }
    (Value::String(x), Value::String(y)) => x.cmp(y),
    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
    _ => type_rank(a).cmp(&type_rank(b)),
  }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DBError> {
    let inner = self.lock();
    inner.check_read(&document_path(collection, id))?;

    let doc = inner.collections.get(collection).and_then(|docs| docs.iter().find(|d| d.id == id));
    Ok(doc.cloned())
  }

  async fn list(&self, collection: &str) -> Result<Vec<Document>, DBError> {
    let inner = self.lock();
    inner.check_read(collection)?;
    Ok(inner.collections.get(collection).cloned().unwrap_or_default())
  }

  async fn add(&self, collection: &str, data: DocumentData) -> Result<String, DBError> {
    let mut inner = self.lock();
    inner.check_write(collection)?;

    let id = Ulid::new().to_string();
    inner
      .collections
      .entry(collection.to_string())
      .or_default()
      .push(Document { id: id.clone(), data });
    inner.notify(collection);

    Ok(id)
  }

  async fn update(&self, collection: &str, id: &str, data: DocumentData) -> Result<(), DBError> {
    let path = document_path(collection, id);
    let mut inner = self.lock();
    inner.check_write(&path)?;

    let doc = inner
      .collections
      .get_mut(collection)
      .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
      .ok_or_else(|| DBError::not_found(&path))?;
    doc.data.extend(data);
    inner.notify(collection);

    Ok(())
  }

  async fn set(&self, collection: &str, id: &str, data: DocumentData) -> Result<(), DBError> {
    let mut inner = self.lock();
    inner.check_write(&document_path(collection, id))?;

    let docs = inner.collections.entry(collection.to_string()).or_default();
    match docs.iter_mut().find(|d| d.id == id) {
      Some(doc) => doc.data = data,
      None => docs.push(Document { id: id.to_string(), data }),
    }
    inner.notify(collection);

    Ok(())
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), DBError> {
    let mut inner = self.lock();
    inner.check_write(&document_path(collection, id))?;

    if let Some(docs) = inner.collections.get_mut(collection) {
      docs.retain(|d| d.id != id);
    }
    inner.notify(collection);

    Ok(())
  }

  async fn watch(&self, query: Query) -> Result<LiveQuery, DBError> {
    let mut inner = self.lock();
    inner.check_read(&query.collection)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let _ = tx.send(Ok(run_query(&inner.collections, &query)));
    inner.watchers.push(Watcher { query, tx });

    Ok(LiveQuery::new(rx, None))
  }
}
