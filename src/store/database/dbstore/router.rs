use crate::store::database::{
  Document, DocumentData, DocumentStore, LiveQuery, Query,
  dbstore::{
    DocumentStoreImpl,
    document_read::{document_get, document_list},
    document_write::{document_add, document_delete, document_set, document_update},
    live_query::document_watch,
  },
  errors::DBError,
};

#[async_trait::async_trait]
impl DocumentStore for DocumentStoreImpl {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DBError> {
    document_get(self, collection, id).await
  }
  async fn list(&self, collection: &str) -> Result<Vec<Document>, DBError> {
    document_list(self, collection).await
  }
  async fn add(&self, collection: &str, data: DocumentData) -> Result<String, DBError> {
    document_add(self, collection, data).await
  }
  async fn update(&self, collection: &str, id: &str, data: DocumentData) -> Result<(), DBError> {
    document_update(self, collection, id, data).await
  }
  async fn set(&self, collection: &str, id: &str, data: DocumentData) -> Result<(), DBError> {
    document_set(self, collection, id, data).await
  }
  async fn delete(&self, collection: &str, id: &str) -> Result<(), DBError> {
    document_delete(self, collection, id).await
  }
  async fn watch(&self, query: Query) -> Result<LiveQuery, DBError> {
    document_watch(self, query).await
  }
}
