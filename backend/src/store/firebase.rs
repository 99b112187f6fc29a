use std::env;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode};

use super::{Document, RemoteStore, dto, object_name};
use crate::error::{AppError, StoreError};
use crate::models::{ImageFile, Kind, Payload, RecordId};

const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_STORAGE_BASE_URL: &str = "https://firebasestorage.googleapis.com/v0";
const PAGE_SIZE: u32 = 300;

#[derive(Clone, Debug)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub api_key: String,
    pub storage_bucket: String,
    pub auth_token: Option<String>,
    pub firestore_base_url: String,
    pub storage_base_url: String,
}

impl FirebaseConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let project_id = env::var("FIREBASE_PROJECT_ID")
            .map_err(|_| AppError::Config("FIREBASE_PROJECT_ID is not set".to_string()))?;
        let api_key = env::var("FIREBASE_API_KEY")
            .map_err(|_| AppError::Config("FIREBASE_API_KEY is not set".to_string()))?;
        let storage_bucket = env::var("FIREBASE_STORAGE_BUCKET")
            .map_err(|_| AppError::Config("FIREBASE_STORAGE_BUCKET is not set".to_string()))?;
        let auth_token = env::var("FIREBASE_AUTH_TOKEN").ok().filter(|t| !t.is_empty());
        let firestore_base_url = env::var("FIRESTORE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_FIRESTORE_BASE_URL.to_string());
        let storage_base_url = env::var("FIREBASE_STORAGE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_STORAGE_BASE_URL.to_string());

        Ok(Self {
            project_id,
            api_key,
            storage_bucket,
            auth_token,
            firestore_base_url: firestore_base_url.trim_end_matches('/').to_string(),
            storage_base_url: storage_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Config pointing both APIs at one base URL, as used by a local emulator or mock.
    pub fn with_base_url(project_id: &str, storage_bucket: &str, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            project_id: project_id.to_string(),
            api_key: "test-key".to_string(),
            storage_bucket: storage_bucket.to_string(),
            auth_token: None,
            firestore_base_url: format!("{}/v1", base_url),
            storage_base_url: format!("{}/v0", base_url),
        }
    }
}

/// Firestore + Firebase Storage over their REST APIs.
pub struct FirebaseHttpClient {
    client: Client,
    config: FirebaseConfig,
}

impl FirebaseHttpClient {
    pub fn new(config: FirebaseConfig) -> Result<Self, StoreError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn documents_url(&self, kind: Kind) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.config.firestore_base_url,
            self.config.project_id,
            kind.collection()
        )
    }

    fn document_url(&self, kind: Kind, id: &str) -> String {
        format!("{}/{}", self.documents_url(kind), urlencoding::encode(id))
    }

    fn with_key(&self, url: String) -> String {
        let sep = if url.contains('?') { '&' } else { '?' };
        format!("{}{}key={}", url, sep, urlencoding::encode(&self.config.api_key))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Public download URL of a stored object.
    pub fn download_url(&self, object_name: &str, token: &str) -> String {
        format!(
            "{}/b/{}/o/{}?alt=media&token={}",
            self.config.storage_base_url,
            self.config.storage_bucket,
            urlencoding::encode(object_name),
            token
        )
    }

    fn write_request(payload: &Payload) -> dto::WriteDocumentRequest {
        dto::WriteDocumentRequest {
            fields: payload
                .iter()
                .map(|(k, v)| {
                    (
                        k.clone(),
                        dto::StringValue {
                            string_value: v.clone(),
                        },
                    )
                })
                .collect(),
        }
    }

    fn to_document(kind: Kind, doc: dto::Document) -> Option<Document> {
        let id = doc.id()?.to_string();
        let mut fields = Payload::new();
        for key in doc.fields.keys() {
            match doc.field_text(key) {
                Some(text) => {
                    fields.insert(key.clone(), text);
                }
                None => tracing::debug!("Ignoring non-scalar field {} on {}/{}", key, kind, id),
            }
        }
        Some(Document { id, fields })
    }
}

async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RemoteStore for FirebaseHttpClient {
    async fn create(&self, kind: Kind, payload: &Payload) -> Result<RecordId, StoreError> {
        let url = self.with_key(self.documents_url(kind));

        let response = self
            .authorize(self.client.post(&url))
            .json(&Self::write_request(payload))
            .send()
            .await?;
        let response = check(response).await?;

        let doc: dto::Document = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let id = doc
            .id()
            .map(str::to_string)
            .ok_or_else(|| StoreError::Decode(format!("Malformed document name: {}", doc.name)))?;

        tracing::info!("Document written to {} with ID: {}", kind, id);
        Ok(id)
    }

    async fn update(&self, kind: Kind, id: &str, payload: &Payload) -> Result<(), StoreError> {
        // without an updateMask the write replaces every field
        let url = self.with_key(format!(
            "{}?currentDocument.exists=true",
            self.document_url(kind, id)
        ));

        let response = self
            .authorize(self.client.patch(&url))
            .json(&Self::write_request(payload))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        check(response).await?;

        tracing::info!("Document {}/{} updated", kind, id);
        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &str) -> Result<(), StoreError> {
        let url = self.with_key(self.document_url(kind, id));

        let response = self.authorize(self.client.delete(&url)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        check(response).await?;

        tracing::info!("Document {}/{} deleted", kind, id);
        Ok(())
    }

    async fn fetch_all(&self, kind: Kind) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}?pageSize={}", self.documents_url(kind), PAGE_SIZE);
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }
            let url = self.with_key(url);

            let response = self.authorize(self.client.get(&url)).send().await?;
            let response = check(response).await?;

            let page: dto::ListDocumentsResponse = response
                .json()
                .await
                .map_err(|e| StoreError::Decode(e.to_string()))?;

            for doc in page.documents {
                let name = doc.name.clone();
                match Self::to_document(kind, doc) {
                    Some(document) => documents.push(document),
                    None => tracing::warn!("Skipping document with malformed name: {}", name),
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }

    async fn upload_file(&self, namespace: &str, file: &ImageFile) -> Result<String, StoreError> {
        let name = object_name(namespace, &file.file_name);
        let url = format!(
            "{}/b/{}/o?uploadType=media&name={}",
            self.config.storage_base_url,
            self.config.storage_bucket,
            urlencoding::encode(&name)
        );

        let response = self
            .authorize(self.client.post(&url))
            .header(CONTENT_TYPE, file.content_type.as_str())
            .body(file.bytes.clone())
            .send()
            .await?;
        let response = check(response).await?;

        let object: dto::StorageObject = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let token = object
            .first_token()
            .ok_or_else(|| StoreError::Upload(format!("No download token for {}", object.name)))?;

        let download_url = self.download_url(&object.name, token);
        tracing::info!("File uploaded successfully! Download URL: {}", download_url);
        Ok(download_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FirebaseHttpClient {
        FirebaseHttpClient::new(FirebaseConfig::with_base_url(
            "demo",
            "demo.appspot.com",
            "http://localhost:9000/",
        ))
        .unwrap()
    }

    #[test]
    fn document_urls() {
        let c = client();
        assert_eq!(
            c.document_url(Kind::Teacher, "t7"),
            "http://localhost:9000/v1/projects/demo/databases/(default)/documents/teachers/t7"
        );
        assert_eq!(
            c.with_key(c.documents_url(Kind::Course)),
            "http://localhost:9000/v1/projects/demo/databases/(default)/documents/courses?key=test-key"
        );
    }

    #[test]
    fn download_url_encodes_object_path() {
        let c = client();
        assert_eq!(
            c.download_url("images/a%20b.png", "tok"),
            "http://localhost:9000/v0/b/demo.appspot.com/o/images%2Fa%2520b.png?alt=media&token=tok"
        );
    }
}
