pub mod dto;
pub mod firebase;
pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{ImageFile, Kind, Payload, RecordId};

pub use firebase::{FirebaseConfig, FirebaseHttpClient};
pub use memory::MemoryStore;

/// A stored document as returned by `fetch_all`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: RecordId,
    pub fields: Payload,
}

/// Document database and file storage the synchronizer writes through.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Writes a new document and returns the id the store assigned to it.
    async fn create(&self, kind: Kind, payload: &Payload) -> Result<RecordId, StoreError>;
    /// Overwrites every field of an existing document.
    async fn update(&self, kind: Kind, id: &str, payload: &Payload) -> Result<(), StoreError>;
    async fn delete(&self, kind: Kind, id: &str) -> Result<(), StoreError>;
    /// Snapshot of the collection in the store's native order.
    async fn fetch_all(&self, kind: Kind) -> Result<Vec<Document>, StoreError>;
    /// Stores the blob and returns a publicly fetchable URL for it.
    async fn upload_file(&self, namespace: &str, file: &ImageFile) -> Result<String, StoreError>;
}

/// Object path for an uploaded file. The file name is percent-encoded so a
/// `/` in it never creates a nested folder.
pub fn object_name(namespace: &str, file_name: &str) -> String {
    format!("{}/{}", namespace, urlencoding::encode(file_name))
}
