use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource path, `projects/{p}/databases/(default)/documents/{collection}/{id}`.
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}

impl Document {
    pub fn id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|id| !id.is_empty())
    }

    /// Text form of a field. Numbers and booleans are rendered, other value
    /// types are treated as absent.
    pub fn field_text(&self, key: &str) -> Option<String> {
        let value = self.fields.get(key)?.as_object()?;
        if let Some(s) = value.get("stringValue").and_then(|v| v.as_str()) {
            return Some(s.to_string());
        }
        // integerValue is sent as a JSON string
        if let Some(v) = value.get("integerValue") {
            return match v {
                serde_json::Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            };
        }
        if let Some(n) = value.get("doubleValue").and_then(|v| v.as_f64()) {
            return Some(n.to_string());
        }
        if let Some(b) = value.get("booleanValue").and_then(|v| v.as_bool()) {
            return Some(b.to_string());
        }
        None
    }
}

#[derive(Debug, Serialize)]
pub struct StringValue {
    #[serde(rename = "stringValue")]
    pub string_value: String,
}

#[derive(Debug, Serialize)]
pub struct WriteDocumentRequest {
    pub fields: BTreeMap<String, StringValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObject {
    pub name: String,
    #[serde(default)]
    pub download_tokens: Option<String>,
}

impl StorageObject {
    /// Firebase may return several comma-separated tokens; any one works.
    pub fn first_token(&self) -> Option<&str> {
        self.download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
