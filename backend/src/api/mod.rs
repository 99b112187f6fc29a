use axum::Json;
use axum::extract::{DefaultBodyLimit, FromRef, Multipart, Path};
use axum::routing::{post, put};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::error::AppError;
use crate::models::{CourseFields, ImageFile, Payload, Record, RecordFields, TeacherFields};
use crate::services::{RecordForm, SubmitOutcome};
use crate::state::{AppState, SharedStore};

/// Multipart part carrying the image file.
pub const IMAGE_FIELD: &str = "image";
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
struct ReloadResponse {
    loaded: usize,
}

pub fn router(state: AppState) -> Router {
    let router = Router::new().route("/health", get(health));
    let router = record_routes::<CourseFields>(router);
    let router = record_routes::<TeacherFields>(router);
    router
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

fn record_routes<F>(router: Router<AppState>) -> Router<AppState>
where
    F: RecordFields,
    SharedStore<F>: FromRef<AppState>,
{
    let base = format!("/{}", F::KIND.collection());
    router
        .route(&base, get(list::<F>).post(create::<F>))
        .route(&format!("{}/reload", base), post(reload::<F>))
        .route(&format!("{}/{{id}}", base), put(update::<F>).delete(remove::<F>))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list<F: RecordFields>(State(store): State<SharedStore<F>>) -> Json<Vec<Record<F>>> {
    Json(store.records().await)
}

async fn create<F: RecordFields>(
    State(store): State<SharedStore<F>>,
    multipart: Multipart,
) -> Result<Json<SubmitOutcome<F>>, AppError> {
    let form = read_form(multipart).await?;

    let mut editor = RecordForm::<F>::new();
    editor.merge_form(form.fields);
    if let Some(image) = form.image {
        editor.attach_image(image);
    }
    let outcome = editor.submit(&store).await?;
    Ok(Json(outcome))
}

async fn update<F: RecordFields>(
    State(store): State<SharedStore<F>>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<SubmitOutcome<F>>, AppError> {
    let form = read_form(multipart).await?;

    let mut editor = RecordForm::<F>::new();
    editor.begin_edit(&store, &id).await?;
    editor.merge_form(form.fields);
    if let Some(image) = form.image {
        editor.attach_image(image);
    }
    let outcome = editor.submit(&store).await?;
    Ok(Json(outcome))
}

async fn remove<F: RecordFields>(
    State(store): State<SharedStore<F>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    store.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reload<F: RecordFields>(
    State(store): State<SharedStore<F>>,
) -> Result<Json<ReloadResponse>, AppError> {
    let loaded = store.load_all().await?;
    Ok(Json(ReloadResponse { loaded }))
}

struct FormData {
    fields: Payload,
    image: Option<ImageFile>,
}

/// Text parts become form fields; the `image` part becomes the upload. An
/// empty file input (no name, no bytes) counts as no image.
async fn read_form(mut multipart: Multipart) -> Result<FormData, AppError> {
    let mut form = FormData {
        fields: Payload::new(),
        image: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read image: {}", e)))?;

            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }
            let file_name = if file_name.is_empty() {
                IMAGE_FIELD.to_string()
            } else {
                file_name
            };
            form.image = Some(ImageFile::new(file_name, content_type, bytes.to_vec()));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}
