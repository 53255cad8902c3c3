use tracing::{debug, error};

use crate::{
  models::errors::StoreError,
  storefront::{ProductRepository, helpers::is_valid_document_id},
  store::database::{PRODUCTS_COLLECTION, document_path},
};

impl ProductRepository {
  /// Deletes the product document and refreshes the list. The product's
  /// reviews stay in the store.
  pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
    let path = "storefront.products.delete";

    if !is_valid_document_id(id) {
      return Err(StoreError::NotFound { path: document_path(PRODUCTS_COLLECTION, id) });
    }

    self.store.delete(PRODUCTS_COLLECTION, id).await.map_err(|err| {
      error!(path, id, err = %err, "failed to delete product");
      StoreError::write(err)
    })?;
    debug!(path, id, "product deleted");

    self.refresh_after_write(id).await
  }
}
