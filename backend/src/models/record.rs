use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote store when a document is first created.
pub type RecordId = String;

/// Flat string map written to and read from a stored document.
pub type Payload = BTreeMap<String, String>;

/// Document key holding the uploaded image URL.
pub const IMAGE_URL_KEY: &str = "imageURL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Course,
    Teacher,
}

impl Kind {
    /// Collection the documents of this kind live in.
    pub fn collection(&self) -> &'static str {
        match self {
            Kind::Course => "courses",
            Kind::Teacher => "teachers",
        }
    }

    /// Storage folder images of this kind are uploaded under.
    pub fn upload_namespace(&self) -> &'static str {
        match self {
            Kind::Course => "images",
            Kind::Teacher => "teachers",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// Scalar fields of one record kind.
pub trait RecordFields:
    Clone + Default + fmt::Debug + PartialEq + Serialize + Send + Sync + 'static
{
    const KIND: Kind;

    /// Every field that must be non-empty, in form order.
    fn required(&self) -> Vec<(&'static str, &str)>;

    /// Copy with surrounding whitespace stripped from every field.
    fn normalized(&self) -> Self;

    fn to_payload(&self) -> Payload;

    /// Missing keys become empty strings.
    fn from_payload(payload: &Payload) -> Self;
}

/// A persisted record as held in the local list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<F> {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: F,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

impl<F: RecordFields> Record<F> {
    pub fn from_payload(id: RecordId, payload: &Payload) -> Self {
        Self {
            id,
            fields: F::from_payload(payload),
            image_url: payload.get(IMAGE_URL_KEY).cloned().unwrap_or_default(),
        }
    }
}

pub(crate) fn build_payload<F: RecordFields>(fields: &F, image_url: &str) -> Payload {
    let mut payload = fields.to_payload();
    payload.insert(IMAGE_URL_KEY.to_string(), image_url.to_string());
    payload
}

/// Binary image picked in a form, held until the submit that uploads it.
#[derive(Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Editable form state for a record being created or edited.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft<F> {
    pub fields: F,
    pub image: Option<ImageFile>,
}

impl<F: RecordFields> Draft<F> {
    pub fn new(fields: F) -> Self {
        Self { fields, image: None }
    }

    pub fn with_image(mut self, image: ImageFile) -> Self {
        self.image = Some(image);
        self
    }

    /// Overrides only the keys present in `form`, keeping the rest.
    pub fn merge_form(&mut self, form: Payload) {
        let mut payload = self.fields.to_payload();
        payload.extend(form);
        self.fields = F::from_payload(&payload);
    }
}
