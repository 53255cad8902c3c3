use std::{error::Error, sync::Arc, time::Duration};

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::models::{config::StoreBackend, errors::InternalError};
use crate::server::Server;
use crate::store::database::DocumentStore;
use crate::store::database::dbstore::{DocumentStoreImpl, DocumentStoreImplArgs};
use crate::store::memory::MemoryStore;

impl Server {
  pub(super) async fn init_store(&self) -> Result<Arc<dyn DocumentStore>, Box<dyn Error>> {
    let path = "storefront.server.init_store";
    let cfg = self.config.lock().await.clone();

    match cfg.service.backend {
      StoreBackend::Memory => {
        info!("using the in-memory document store");
        Ok(Arc::new(MemoryStore::new()))
      }
      StoreBackend::Postgres => {
        let db_cfg = cfg.database.ok_or_else(|| InternalError {
          temp: false,
          err: "the database section is missing".into(),
          msg: "the postgres backend needs a database config".into(),
          path: path.into(),
        })?;

        let db = PgPoolOptions::new()
          .max_connections(db_cfg.max_open_conns)
          .min_connections(db_cfg.max_idle_conns)
          .max_lifetime(Duration::from_millis(db_cfg.conn_max_lifetime_milliseconds))
          .idle_timeout(Duration::from_millis(db_cfg.conn_max_idle_time_milliseconds))
          .connect(&db_cfg.data_source)
          .await
          .map_err(|e| InternalError {
            temp: false,
            err: Box::new(e),
            msg: "failed to connect to database".into(),
            path: path.into(),
          })?;

        let store = DocumentStoreImpl::new(DocumentStoreImplArgs { db: Arc::new(db) });
        store.init_schema().await.map_err(|e| InternalError {
          temp: false,
          err: Box::new(e),
          msg: "failed to prepare the documents table".into(),
          path: path.into(),
        })?;

        info!("using the postgres document store");
        Ok(Arc::new(store))
      }
    }
  }
}
