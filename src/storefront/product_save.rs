use tracing::{debug, error, warn};

use crate::{
  models::{errors::StoreError, products::Product},
  storefront::{ProductRepository, helpers::is_valid_document_id},
  store::database::{PRODUCTS_COLLECTION, document_path},
};

impl ProductRepository {
  /// Inserts the product when it has no id (an empty id counts as none) and
  /// merge-updates the stored document otherwise. Returns the product with
  /// its id once the list has been refreshed.
  pub async fn save(&self, product: Product) -> Result<Product, StoreError> {
    let path = "storefront.products.save";

    product.validate().inspect_err(|err| warn!(path, err = %err, "rejected product"))?;

    let existing_id = product.id.clone().filter(|id| !id.is_empty());
    let doc_path = match &existing_id {
      Some(id) => document_path(PRODUCTS_COLLECTION, id),
      None => PRODUCTS_COLLECTION.to_string(),
    };

    let data = product.to_document_data(&doc_path).map_err(|err| {
      error!(path, err = %err, "failed to encode product");
      StoreError::Write(err)
    })?;

    let id = match existing_id {
      Some(id) => {
        if !is_valid_document_id(&id) {
          return Err(StoreError::NotFound { path: doc_path });
        }
        self.store.update(PRODUCTS_COLLECTION, &id, data).await.map_err(|err| {
          error!(path, id, err = %err, "failed to update product");
          StoreError::write(err)
        })?;
        debug!(path, id, "product updated");
        id
      }
      None => {
        let id = self.store.add(PRODUCTS_COLLECTION, data).await.map_err(|err| {
          error!(path, err = %err, "failed to add product");
          StoreError::write(err)
        })?;
        debug!(path, id, "product added");
        id
      }
    };

    self.refresh_after_write(&id).await?;

    Ok(Product { id: Some(id), ..product })
  }
}
