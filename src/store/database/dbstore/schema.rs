use crate::store::database::{
  dbstore::DocumentStoreImpl,
  errors::{DBError, handle_db_error},
};

const SCHEMA: &str = r#"
  CREATE TABLE IF NOT EXISTS documents (
    seq         BIGSERIAL NOT NULL,
    collection  TEXT NOT NULL,
    id          TEXT NOT NULL,
    data        JSONB NOT NULL DEFAULT '{}'::jsonb,
    PRIMARY KEY (collection, id)
  );

  CREATE INDEX IF NOT EXISTS documents_collection_seq_idx ON documents (collection, seq);

  CREATE OR REPLACE FUNCTION documents_notify() RETURNS trigger AS $$
  BEGIN
    IF TG_OP = 'DELETE' THEN
      PERFORM pg_notify('documents_changed', OLD.collection);
    ELSE
      PERFORM pg_notify('documents_changed', NEW.collection);
    END IF;
    RETURN NULL;
  END;
  $$ LANGUAGE plpgsql;

  DROP TRIGGER IF EXISTS documents_changed ON documents;
  CREATE TRIGGER documents_changed
    AFTER INSERT OR UPDATE OR DELETE ON documents
    FOR EACH ROW EXECUTE FUNCTION documents_notify();
"#;

impl DocumentStoreImpl {
  /// Creates the documents table and its change-notification trigger.
  pub async fn init_schema(&self) -> Result<(), DBError> {
    sqlx::raw_sql(SCHEMA)
      .execute(self.db.as_ref())
      .await
      .map_err(|err| handle_db_error(err, "storefront.store.init_schema"))?;

    Ok(())
  }
}
