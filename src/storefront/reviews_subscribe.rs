use std::sync::{Arc, Mutex, atomic::Ordering};

use tokio::{spawn, sync::broadcast};
use tracing::{debug, error, warn};

use crate::{
  models::{errors::StoreError, reviews::Review},
  storefront::{
    ReviewSubscriptions,
    helpers::lock,
    reviews::{ActiveSubscription, ReviewState},
  },
  store::database::{
    Direction, LiveQuery, Query, REVIEWS_ORDER_FIELD, document_path, reviews_collection,
  },
};

/// Stops one product's review subscription. Dropping the handle without
/// calling [`CancelHandle::cancel`] leaves the subscription running.
#[derive(Debug)]
pub struct CancelHandle {
  product_id: String,
  generation: u64,
  state: Arc<Mutex<ReviewState>>,
}

impl CancelHandle {
  pub fn product_id(&self) -> &str {
    &self.product_id
  }

  /// No cache update for this product happens after this returns. The
  /// cached reviews stay. A no-op if the subscription was already replaced
  /// by a newer one.
  pub fn cancel(self) {
    let mut state = lock(&self.state);
    if !state.is_active(&self.product_id, self.generation) {
      return;
    }
    if let Some(active) = state.active.remove(&self.product_id) {
      active.task.abort();
      debug!(product_id = %self.product_id, "review subscription cancelled");
    }
  }
}

impl ReviewSubscriptions {
  /// Opens a live query on the product's reviews, newest first. An earlier
  /// subscription for the same product is cancelled and replaced.
  pub async fn subscribe(&self, product_id: &str) -> Result<CancelHandle, StoreError> {
    let path = "storefront.reviews.subscribe";

    let query = Query::collection(reviews_collection(product_id))
      .order_by(REVIEWS_ORDER_FIELD, Direction::Desc);
    let live = self.store.watch(query).await.map_err(|err| {
      error!(path, product_id, err = %err, "failed to open review subscription");
      StoreError::read(err)
    })?;

    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

    {
      // registered before the task can apply its first snapshot
      let mut state = lock(&self.state);
      let task = spawn(run_subscription(
        live,
        self.state.clone(),
        self.updates.clone(),
        product_id.to_string(),
        generation,
      ));
      let active = ActiveSubscription { generation, task: task.abort_handle() };
      if let Some(previous) = state.active.insert(product_id.to_string(), active) {
        previous.task.abort();
        debug!(path, product_id, "replaced an existing review subscription");
      }
    }

    Ok(CancelHandle { product_id: product_id.to_string(), generation, state: self.state.clone() })
  }

  /// One subscription per product currently in the cached list. Products
  /// added later need another call. If any subscription fails to open, the
  /// ones already opened by this call are cancelled before the error is
  /// returned.
  pub async fn subscribe_all(&self) -> Result<Vec<CancelHandle>, StoreError> {
    let ids = self.products.product_ids();
    let mut handles = Vec::with_capacity(ids.len());
    for id in ids {
      match self.subscribe(&id).await {
        Ok(handle) => handles.push(handle),
        Err(err) => {
          warn!(opened = handles.len(), "subscribe_all failed, cancelling opened subscriptions");
          for handle in handles {
            handle.cancel();
          }
          return Err(err);
        }
      }
    }
    Ok(handles)
  }

  /// Cancels every active subscription, keeping the cached reviews.
  pub fn cancel_all(&self) {
    let mut state = lock(&self.state);
    for (_, active) in state.active.drain() {
      active.task.abort();
    }
  }
}

async fn run_subscription(
  mut live: LiveQuery,
  state: Arc<Mutex<ReviewState>>,
  updates: broadcast::Sender<String>,
  product_id: String,
  generation: u64,
) {
  let collection = reviews_collection(&product_id);

  while let Some(snapshot) = live.next().await {
    let docs = match snapshot {
      Ok(docs) => docs,
      Err(err) => {
        let err = StoreError::Subscription(err);
        warn!(product_id = %product_id, err = %err, "review subscription error");
        continue;
      }
    };

    let reviews: Vec<Review> = docs
      .into_iter()
      .filter_map(|doc| {
        let doc_path = document_path(&collection, &doc.id);
        Review::from_document(doc, &doc_path)
          .inspect_err(|err| warn!(err = %err, "skipping malformed review document"))
          .ok()
      })
      .collect();

    let applied = {
      let mut state = lock(&state);
      if state.is_active(&product_id, generation) {
        state.reviews.insert(product_id.clone(), reviews);
        true
      } else {
        false
      }
    };
    if !applied {
      return;
    }

    let _ = updates.send(product_id.clone());
  }

  debug!(product_id = %product_id, "review live query closed");
}
