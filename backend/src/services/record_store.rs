use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::models::record::build_payload;
use crate::models::{Draft, ImageFile, Payload, Record, RecordFields, RecordId};
use crate::store::RemoteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitOutcome<F> {
    pub mode: SubmitMode,
    pub record: Record<F>,
}

/// Local cache of one record kind, shared by every form and request.
///
/// `submit`, `remove` and `load_all` are the only operations that talk to the
/// remote store. The list lock is never held across a remote call, and the
/// list is changed only after the remote call has succeeded.
pub struct RecordStore<F: RecordFields> {
    remote: Arc<dyn RemoteStore>,
    records: RwLock<Vec<Record<F>>>,
}

impl<F: RecordFields> RecordStore<F> {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of the local list.
    pub async fn records(&self) -> Vec<Record<F>> {
        self.records.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Record<F>> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    /// Presence check over the required fields. The image is only required
    /// when creating.
    pub fn validate(draft: &Draft<F>, editing: bool) -> Result<F, SyncError> {
        let fields = draft.fields.normalized();
        if let Some((name, _)) = fields.required().into_iter().find(|(_, v)| v.is_empty()) {
            return Err(SyncError::MissingField(name));
        }
        if !editing && draft.image.is_none() {
            return Err(SyncError::MissingField("image"));
        }
        Ok(fields)
    }

    /// Uploads the draft's image, writes the record and reconciles the list.
    /// `editing_id` selects update over create and must name a listed record.
    ///
    /// A failed upload is not fatal: the record keeps its previous image URL
    /// when editing, or none when creating.
    pub async fn submit(
        &self,
        draft: &Draft<F>,
        editing_id: Option<&str>,
    ) -> Result<SubmitOutcome<F>, SyncError> {
        let kind = F::KIND;
        let fields = Self::validate(draft, editing_id.is_some())?;

        let previous_url = match editing_id {
            Some(id) => self
                .get(id)
                .await
                .map(|r| r.image_url)
                .ok_or_else(|| SyncError::NotFound(id.to_string()))?,
            None => String::new(),
        };

        let image_url = match &draft.image {
            Some(image) => match self.remote.upload_file(kind.upload_namespace(), image).await {
                Ok(url) => url,
                Err(e) => {
                    warn!("Image upload for {} failed, keeping previous URL: {}", kind, e);
                    previous_url
                }
            },
            None => previous_url,
        };

        let payload = build_payload(&fields, &image_url);

        let outcome = match editing_id {
            Some(id) => {
                self.remote
                    .update(kind, id, &payload)
                    .await
                    .map_err(SyncError::Persistence)?;
                let record = Record {
                    id: id.to_string(),
                    fields,
                    image_url,
                };
                self.reconcile_updated(record.clone()).await;
                info!("Updated {} record {}", kind, record.id);
                SubmitOutcome {
                    mode: SubmitMode::Updated,
                    record,
                }
            }
            None => {
                let id = self
                    .remote
                    .create(kind, &payload)
                    .await
                    .map_err(SyncError::Persistence)?;
                let record = Record {
                    id,
                    fields,
                    image_url,
                };
                self.reconcile_created(record.clone()).await;
                info!("Created {} record {}", kind, record.id);
                SubmitOutcome {
                    mode: SubmitMode::Created,
                    record,
                }
            }
        };

        Ok(outcome)
    }

    /// Deletes remotely, then drops the entry from the local list.
    pub async fn remove(&self, id: &str) -> Result<(), SyncError> {
        let kind = F::KIND;
        self.remote
            .delete(kind, id)
            .await
            .map_err(SyncError::Persistence)?;

        self.records.write().await.retain(|r| r.id != id);
        info!("Deleted {} record {}", kind, id);
        Ok(())
    }

    /// Replaces the whole local list with the remote snapshot. On failure the
    /// current list is kept.
    pub async fn load_all(&self) -> Result<usize, SyncError> {
        let kind = F::KIND;
        let documents = self.remote.fetch_all(kind).await.map_err(SyncError::Fetch)?;

        let mut records: Vec<Record<F>> = Vec::with_capacity(documents.len());
        for doc in documents {
            if records.iter().any(|r| r.id == doc.id) {
                warn!("Skipping duplicate {} document {}", kind, doc.id);
                continue;
            }
            records.push(Record::from_payload(doc.id, &doc.fields));
        }

        let loaded = records.len();
        *self.records.write().await = records;
        info!("Loaded {} {} records", loaded, kind);
        Ok(loaded)
    }

    async fn reconcile_created(&self, record: Record<F>) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    async fn reconcile_updated(&self, record: Record<F>) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                existing.fields = record.fields;
                existing.image_url = record.image_url;
            }
            // a reload raced the update and dropped the entry
            None => warn!("Updated {} record {} is not in the local list", F::KIND, record.id),
        }
    }
}

/// One admin form: the draft being edited and, in edit mode, the id it
/// belongs to. Owned by whoever drives the form, so a submit waiting on the
/// remote store holds up only this form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordForm<F> {
    draft: Draft<F>,
    editing_id: Option<RecordId>,
}

impl<F: RecordFields> RecordForm<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft<F> {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn set_fields(&mut self, fields: F) {
        self.draft.fields = fields;
    }

    pub fn merge_form(&mut self, form: Payload) {
        self.draft.merge_form(form);
    }

    pub fn attach_image(&mut self, image: ImageFile) {
        self.draft.image = Some(image);
    }

    /// Back to an empty create form.
    pub fn reset_draft(&mut self) {
        self.draft = Draft::default();
        self.editing_id = None;
    }

    /// Enters edit mode for a persisted record, pre-filling the draft from it.
    pub async fn begin_edit(&mut self, store: &RecordStore<F>, id: &str) -> Result<(), SyncError> {
        let record = store
            .get(id)
            .await
            .ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        self.draft = Draft::new(record.fields);
        self.editing_id = Some(record.id);
        Ok(())
    }

    /// Submits the draft. The draft and held image are released on success
    /// and kept for another attempt on failure.
    pub async fn submit(&mut self, store: &RecordStore<F>) -> Result<SubmitOutcome<F>, SyncError> {
        let outcome = store.submit(&self.draft, self.editing_id.as_deref()).await?;
        self.reset_draft();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseFields;
    use crate::store::MemoryStore;

    fn course(name: &str) -> CourseFields {
        CourseFields {
            name: name.to_string(),
            brief: "Intro".to_string(),
            detailed: "Full intro".to_string(),
            price: "10".to_string(),
        }
    }

    #[test]
    fn whitespace_only_field_is_missing() {
        let mut fields = course("Algebra");
        fields.brief = "   ".to_string();
        let draft = Draft::new(fields);
        let err = RecordStore::<CourseFields>::validate(&draft, true).unwrap_err();
        assert!(matches!(err, SyncError::MissingField("brief")));
    }

    #[test]
    fn image_required_only_when_creating() {
        let draft = Draft::new(course("Algebra"));
        assert!(matches!(
            RecordStore::<CourseFields>::validate(&draft, false),
            Err(SyncError::MissingField("image"))
        ));
        let fields = RecordStore::<CourseFields>::validate(&draft, true).unwrap();
        assert_eq!(fields, course("Algebra"));
    }

    #[test]
    fn validate_trims_fields() {
        let draft = Draft::new(course("  Algebra "))
            .with_image(ImageFile::new("a.png", "image/png", vec![1]));
        let fields = RecordStore::<CourseFields>::validate(&draft, false).unwrap();
        assert_eq!(fields.name, "Algebra");
    }

    #[tokio::test]
    async fn begin_edit_prefills_draft() {
        let store = RecordStore::<CourseFields>::new(Arc::new(MemoryStore::new()));
        let draft = Draft::new(course("Algebra"))
            .with_image(ImageFile::new("a.png", "image/png", vec![1]));
        let created = store.submit(&draft, None).await.unwrap();

        let mut form = RecordForm::new();
        form.begin_edit(&store, &created.record.id).await.unwrap();
        assert_eq!(form.editing_id(), Some(created.record.id.as_str()));
        assert_eq!(form.draft().fields, course("Algebra"));
        assert!(form.draft().image.is_none());

        assert!(matches!(
            form.begin_edit(&store, "missing").await,
            Err(SyncError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn form_submit_resets_on_success_only() {
        let store = RecordStore::<CourseFields>::new(Arc::new(MemoryStore::new()));
        let mut form = RecordForm::new();
        form.set_fields(course("Algebra"));

        // no image yet, so the create is rejected and the draft stays
        assert!(form.submit(&store).await.is_err());
        assert_eq!(form.draft().fields, course("Algebra"));

        form.attach_image(ImageFile::new("a.png", "image/png", vec![1]));
        let outcome = form.submit(&store).await.unwrap();
        assert_eq!(outcome.mode, SubmitMode::Created);
        assert_eq!(form, RecordForm::new());
    }
}
