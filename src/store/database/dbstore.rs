mod document_read;
mod document_write;
mod live_query;
mod router;
mod schema;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub(crate) const NOTIFY_CHANNEL: &str = "documents_changed";

/// Document store over a single Postgres `documents` table holding JSONB
/// bodies. Live queries are driven by `LISTEN/NOTIFY`.
#[derive(Debug)]
pub struct DocumentStoreImpl {
  pub(crate) db: Arc<Pool<Postgres>>,
}

#[derive(Debug)]
pub struct DocumentStoreImplArgs {
  pub db: Arc<Pool<Postgres>>,
}

impl DocumentStoreImpl {
  pub fn new(args: DocumentStoreImplArgs) -> Self {
    Self { db: args.db }
  }
}
