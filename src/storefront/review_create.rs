use tracing::{debug, error, warn};

use crate::{
  models::{errors::StoreError, reviews::ReviewDraft, time::now_millis},
  storefront::{ReviewSubscriptions, helpers::is_valid_document_id},
  store::database::{PRODUCTS_COLLECTION, document_path, reviews_collection},
};

impl ReviewSubscriptions {
  /// Appends a review stamped with the current time. The cache is not
  /// touched; the review shows up with the next snapshot of an open
  /// subscription.
  pub async fn add_review(&self, product_id: &str, draft: ReviewDraft) -> Result<(), StoreError> {
    let path = "storefront.reviews.add_review";

    if !is_valid_document_id(product_id) {
      return Err(StoreError::NotFound { path: document_path(PRODUCTS_COLLECTION, product_id) });
    }
    draft.validate().inspect_err(|err| warn!(path, err = %err, "rejected review"))?;

    let collection = reviews_collection(product_id);
    let data = draft.into_document_data(now_millis(), &collection).map_err(|err| {
      error!(path, product_id, err = %err, "failed to encode review");
      StoreError::Write(err)
    })?;

    let id = self.store.add(&collection, data).await.map_err(|err| {
      error!(path, product_id, err = %err, "failed to add review");
      StoreError::write(err)
    })?;
    debug!(path, product_id, id, "review added");

    Ok(())
  }
}
