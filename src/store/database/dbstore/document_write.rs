use serde_json::Value;
use ulid::Ulid;

use crate::store::database::{
  DocumentData,
  dbstore::DocumentStoreImpl,
  document_path,
  errors::{DBError, handle_db_error},
};

pub(super) async fn document_add(
  s: &DocumentStoreImpl,
  collection: &str,
  data: DocumentData,
) -> Result<String, DBError> {
  let path = "storefront.store.document_add";
  let id = Ulid::new().to_string();

  sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
    .bind(collection)
    .bind(&id)
    .bind(Value::Object(data))
    .execute(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, path))?;

  Ok(id)
}

pub(super) async fn document_update(
  s: &DocumentStoreImpl,
  collection: &str,
  id: &str,
  data: DocumentData,
) -> Result<(), DBError> {
  let path = "storefront.store.document_update";

  // `||` merges top-level keys, so fields missing from `data` survive
  let res = sqlx::query(
    "UPDATE documents SET data = data || $3 WHERE collection = $1 AND id = $2",
  )
  .bind(collection)
  .bind(id)
  .bind(Value::Object(data))
  .execute(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, path))?;

  if res.rows_affected() == 0 {
    return Err(DBError::not_found(document_path(collection, id)));
  }

  Ok(())
}

pub(super) async fn document_set(
  s: &DocumentStoreImpl,
  collection: &str,
  id: &str,
  data: DocumentData,
) -> Result<(), DBError> {
  let path = "storefront.store.document_set";

  sqlx::query(
    r#"
      INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
      ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data
    "#,
  )
  .bind(collection)
  .bind(id)
  .bind(Value::Object(data))
  .execute(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, path))?;

  Ok(())
}

pub(super) async fn document_delete(
  s: &DocumentStoreImpl,
  collection: &str,
  id: &str,
) -> Result<(), DBError> {
  let path = "storefront.store.document_delete";

  sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
    .bind(collection)
    .bind(id)
    .execute(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, path))?;

  Ok(())
}
