use std::{
  collections::HashMap,
  sync::{Arc, Mutex, atomic::AtomicU64},
};

use tokio::{sync::broadcast, task::AbortHandle};

use crate::{
  models::reviews::{Review, ReviewSummary, average_rating},
  storefront::{ProductRepository, helpers::lock},
  store::database::DocumentStore,
};

const UPDATES_CAPACITY: usize = 64;

/// Owns the per-product review caches and the live queries feeding them.
/// Each delivered snapshot replaces a product's cached list wholesale.
#[derive(Debug)]
pub struct ReviewSubscriptions {
  pub(super) store: Arc<dyn DocumentStore>,
  pub(super) products: Arc<ProductRepository>,
  pub(super) state: Arc<Mutex<ReviewState>>,
  pub(super) next_generation: AtomicU64,
  pub(super) updates: broadcast::Sender<String>,
}

#[derive(Debug, Default)]
pub(super) struct ReviewState {
  pub(super) reviews: HashMap<String, Vec<Review>>,
  pub(super) active: HashMap<String, ActiveSubscription>,
}

#[derive(Debug)]
pub(super) struct ActiveSubscription {
  pub(super) generation: u64,
  pub(super) task: AbortHandle,
}

impl ReviewState {
  pub(super) fn is_active(&self, product_id: &str, generation: u64) -> bool {
    self.active.get(product_id).is_some_and(|a| a.generation == generation)
  }
}

impl ReviewSubscriptions {
  pub fn new(store: Arc<dyn DocumentStore>, products: Arc<ProductRepository>) -> Self {
    let (updates, _) = broadcast::channel(UPDATES_CAPACITY);
    Self {
      store,
      products,
      state: Arc::new(Mutex::new(ReviewState::default())),
      next_generation: AtomicU64::new(1),
      updates,
    }
  }

  /// Receives the id of every product whose cached reviews were replaced.
  pub fn updates(&self) -> broadcast::Receiver<String> {
    self.updates.subscribe()
  }

  /// The cached reviews, newest first. Empty until a snapshot arrived.
  pub fn reviews_for(&self, product_id: &str) -> Vec<Review> {
    lock(&self.state).reviews.get(product_id).cloned().unwrap_or_default()
  }

  pub fn average_rating(&self, product_id: &str) -> f64 {
    let state = lock(&self.state);
    average_rating(state.reviews.get(product_id).map(Vec::as_slice).unwrap_or_default())
  }

  pub fn review_count(&self, product_id: &str) -> usize {
    lock(&self.state).reviews.get(product_id).map_or(0, Vec::len)
  }

  pub fn review_summary(&self, product_id: &str) -> ReviewSummary {
    let state = lock(&self.state);
    let reviews = state.reviews.get(product_id).map(Vec::as_slice).unwrap_or_default();
    ReviewSummary::from_reviews(reviews)
  }

  pub fn is_subscribed(&self, product_id: &str) -> bool {
    lock(&self.state).active.contains_key(product_id)
  }

  pub fn active_subscriptions(&self) -> usize {
    lock(&self.state).active.len()
  }
}
