use tracing::{error, warn};

use crate::{
  models::{errors::StoreError, products::Product},
  storefront::ProductRepository,
  store::database::{PRODUCTS_COLLECTION, document_path},
};

impl ProductRepository {
  /// Replaces the cached list with the whole `products` collection, in the
  /// order the store returns it. On failure the cached list is kept.
  pub async fn fetch_all(&self) -> Result<Vec<Product>, StoreError> {
    let path = "storefront.products.fetch_all";

    let docs = self.store.list(PRODUCTS_COLLECTION).await.map_err(|err| {
      error!(path, err = %err, "failed to fetch products");
      StoreError::read(err)
    })?;

    let products: Vec<Product> = docs
      .into_iter()
      .filter_map(|doc| {
        let doc_path = document_path(PRODUCTS_COLLECTION, &doc.id);
        match Product::from_document(doc, &doc_path) {
          Ok(product) => Some(product),
          Err(err) => {
            warn!(path, err = %err, "skipping malformed product document");
            None
          }
        }
      })
      .collect();

    self.replace_products(products.clone());
    Ok(products)
  }

  /// Startup load. A failure is logged and the list stays as it was
  /// (empty on a fresh repository).
  pub async fn hydrate(&self) {
    if let Err(err) = self.fetch_all().await {
      let path = "storefront.products.hydrate";
      warn!(path, err = %err, "starting with an empty product list");
    }
  }

  pub(super) async fn refresh_after_write(&self, id: &str) -> Result<(), StoreError> {
    let path = "storefront.products.refresh";
    self.fetch_all().await.map(|_| ()).map_err(|err| {
      error!(path, id, err = %err, "write succeeded, refresh failed");
      StoreError::Refresh { id: id.to_string(), source: Box::new(err) }
    })
  }
}
