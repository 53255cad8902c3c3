use std::sync::{Arc, RwLock};

use crate::{
  models::products::{Category, Product, ProductFilter},
  storefront::helpers::{read, write},
  store::database::DocumentStore,
};

/// Owns the in-memory product list. All product writes go through here and
/// are followed by a full refresh of the list.
#[derive(Debug)]
pub struct ProductRepository {
  pub(super) store: Arc<dyn DocumentStore>,
  products: RwLock<Vec<Product>>,
}

impl ProductRepository {
  pub fn new(store: Arc<dyn DocumentStore>) -> Self {
    Self { store, products: RwLock::new(vec![]) }
  }

  /// The cached list in store order.
  pub fn products(&self) -> Vec<Product> {
    read(&self.products).clone()
  }

  pub fn product_ids(&self) -> Vec<String> {
    read(&self.products).iter().filter_map(|p| p.id.clone()).collect()
  }

  pub fn categories(&self) -> &'static [Category] {
    &Category::ALL
  }

  pub fn filtered_products(&self, filter: &ProductFilter) -> Vec<Product> {
    filter.apply(&read(&self.products))
  }

  pub(super) fn replace_products(&self, products: Vec<Product>) {
    *write(&self.products) = products;
  }
}
