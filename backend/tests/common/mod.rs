#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use academy_admin::error::StoreError;
use academy_admin::models::{ImageFile, Kind, Payload, RecordId};
use academy_admin::store::{Document, MemoryStore, RemoteStore};
use async_trait::async_trait;

/// A remote store call as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(Kind),
    Update(Kind, String, Payload),
    Delete(Kind, String),
    FetchAll(Kind),
    Upload(String, String),
}

/// MemoryStore wrapper that records every call and can be told to fail.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    calls: Mutex<Vec<Call>>,
    pub fail_uploads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_fetch: AtomicBool,
    /// Uploads never complete while set.
    pub hang_uploads: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn set(flag: &AtomicBool, on: bool) {
        flag.store(on, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn api_error() -> StoreError {
        StoreError::Api {
            status: 503,
            body: "unavailable".to_string(),
        }
    }
}

#[async_trait]
impl RemoteStore for RecordingStore {
    async fn create(&self, kind: Kind, payload: &Payload) -> Result<RecordId, StoreError> {
        self.record(Call::Create(kind));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::api_error());
        }
        self.inner.create(kind, payload).await
    }

    async fn update(&self, kind: Kind, id: &str, payload: &Payload) -> Result<(), StoreError> {
        self.record(Call::Update(kind, id.to_string(), payload.clone()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::api_error());
        }
        self.inner.update(kind, id, payload).await
    }

    async fn delete(&self, kind: Kind, id: &str) -> Result<(), StoreError> {
        self.record(Call::Delete(kind, id.to_string()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::api_error());
        }
        self.inner.delete(kind, id).await
    }

    async fn fetch_all(&self, kind: Kind) -> Result<Vec<Document>, StoreError> {
        self.record(Call::FetchAll(kind));
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Self::api_error());
        }
        self.inner.fetch_all(kind).await
    }

    async fn upload_file(&self, namespace: &str, file: &ImageFile) -> Result<String, StoreError> {
        self.record(Call::Upload(namespace.to_string(), file.file_name.clone()));
        if self.hang_uploads.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StoreError::Upload("bucket unavailable".to_string()));
        }
        self.inner.upload_file(namespace, file).await
    }
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(name, "image/png", vec![0x89, b'P', b'N', b'G'])
}

pub fn payload(fields: &[(&str, &str)]) -> Payload {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Seeds a document directly into the backing store, bypassing call recording.
pub async fn seed(store: &RecordingStore, kind: Kind, id: &str, fields: &[(&str, &str)]) {
    store.inner.insert(kind, id, payload(fields)).await;
}
