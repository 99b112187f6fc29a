use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Document, RemoteStore, object_name};
use crate::error::StoreError;
use crate::models::{ImageFile, Kind, Payload, RecordId};

/// In-process store for local development and tests. Documents keep their
/// insertion order.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<Kind, Vec<Document>>>,
    files: RwLock<HashMap<String, ImageFile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection, bypassing the `RemoteStore` interface.
    pub async fn documents(&self, kind: Kind) -> Vec<Document> {
        self.documents
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Inserts a document under a caller-chosen id, replacing any existing one.
    pub async fn insert(&self, kind: Kind, id: impl Into<RecordId>, fields: Payload) {
        let id = id.into();
        let mut documents = self.documents.write().await;
        let docs = documents.entry(kind).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => doc.fields = fields,
            None => docs.push(Document { id, fields }),
        }
    }

    /// File previously stored under `url`, if any.
    pub async fn file(&self, url: &str) -> Option<ImageFile> {
        self.files.read().await.get(url).cloned()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn create(&self, kind: Kind, payload: &Payload) -> Result<RecordId, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.documents
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(Document {
                id: id.clone(),
                fields: payload.clone(),
            });
        Ok(id)
    }

    async fn update(&self, kind: Kind, id: &str, payload: &Payload) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let doc = documents
            .get_mut(&kind)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        doc.fields = payload.clone();
        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &str) -> Result<(), StoreError> {
        if let Some(docs) = self.documents.write().await.get_mut(&kind) {
            docs.retain(|d| d.id != id);
        }
        Ok(())
    }

    async fn fetch_all(&self, kind: Kind) -> Result<Vec<Document>, StoreError> {
        Ok(self.documents(kind).await)
    }

    async fn upload_file(&self, namespace: &str, file: &ImageFile) -> Result<String, StoreError> {
        let url = format!("memory://{}", object_name(namespace, &file.file_name));
        self.files.write().await.insert(url.clone(), file.clone());
        Ok(url)
    }
}
