use tracing::{debug, error};

use crate::{
  models::{errors::StoreError, products::Product},
  storefront::{ProductRepository, helpers::is_valid_document_id},
  store::database::{PRODUCTS_COLLECTION, document_path},
};

impl ProductRepository {
  /// Reads one product straight from the store. The cached list is not
  /// touched.
  pub async fn fetch_one(&self, id: &str) -> Result<Product, StoreError> {
    let path = "storefront.products.fetch_one";
    let doc_path = document_path(PRODUCTS_COLLECTION, id);

    if !is_valid_document_id(id) {
      debug!(path, id, "invalid product id");
      return Err(StoreError::NotFound { path: doc_path });
    }

    let doc = self.store.get(PRODUCTS_COLLECTION, id).await.map_err(|err| {
      error!(path, id, err = %err, "failed to fetch product");
      StoreError::read(err)
    })?;

    let Some(doc) = doc else {
      debug!(path, id, "product not found");
      return Err(StoreError::NotFound { path: doc_path });
    };

    Product::from_document(doc, &doc_path).map_err(|err| {
      error!(path, id, err = %err, "failed to decode product");
      StoreError::Read(err)
    })
  }
}
