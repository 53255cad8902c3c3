use serde_json::{Value, from_value};
use sqlx::{Row, postgres::PgRow};

use crate::store::database::{
  Direction, Document, DocumentData, Query,
  dbstore::DocumentStoreImpl,
  errors::{DBError, handle_db_error},
};

pub(super) fn row_to_document(row: PgRow, path: &str) -> Result<Document, DBError> {
  let id: String = row.try_get("id").map_err(|err| handle_db_error(err, path))?;
  let data: Value = row.try_get("data").map_err(|err| handle_db_error(err, path))?;
  let data: DocumentData = from_value(data).map_err(|err| DBError::json_unmarshal(err, path))?;

  Ok(Document { id, data })
}

pub(super) async fn document_get(
  s: &DocumentStoreImpl,
  collection: &str,
  id: &str,
) -> Result<Option<Document>, DBError> {
  let path = "storefront.store.document_get";

  let row = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
    .bind(collection)
    .bind(id)
    .fetch_optional(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, path))?;

  row.map(|r| row_to_document(r, path)).transpose()
}

pub(super) async fn document_list(
  s: &DocumentStoreImpl,
  collection: &str,
) -> Result<Vec<Document>, DBError> {
  let path = "storefront.store.document_list";

  let rows = sqlx::query("SELECT id, data FROM documents WHERE collection = $1 ORDER BY seq")
    .bind(collection)
    .fetch_all(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, path))?;

  rows.into_iter().map(|r| row_to_document(r, path)).collect()
}

/// Runs a live query once. Documents missing the ordering field are left
/// out, ties keep insertion order.
pub(super) async fn query_snapshot(
  db: &sqlx::Pool<sqlx::Postgres>,
  query: &Query,
) -> Result<Vec<Document>, DBError> {
  let path = "storefront.store.query_snapshot";

  let rows = match &query.order_by {
    Some((field, direction)) => {
      let dir = match direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
      };
      let sql = format!(
        r#"
          SELECT id, data FROM documents
          WHERE collection = $1 AND data ? $2
          ORDER BY data -> $2 {}, seq
        "#,
        dir
      );
      sqlx::query(&sql).bind(&query.collection).bind(field).fetch_all(db).await
    }
    None => {
      sqlx::query("SELECT id, data FROM documents WHERE collection = $1 ORDER BY seq")
        .bind(&query.collection)
        .fetch_all(db)
        .await
    }
  }
  .map_err(|err| handle_db_error(err, path))?;

  rows.into_iter().map(|r| row_to_document(r, path)).collect()
}
