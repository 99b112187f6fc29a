use std::sync::Arc;

use axum::extract::FromRef;

use crate::models::{CourseFields, TeacherFields};
use crate::services::RecordStore;
use crate::store::RemoteStore;

/// One kind's `RecordStore`, shared between handlers and the scheduler.
pub type SharedStore<F> = Arc<RecordStore<F>>;

#[derive(Clone)]
pub struct AppState {
    pub courses: SharedStore<CourseFields>,
    pub teachers: SharedStore<TeacherFields>,
}

impl AppState {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            courses: Arc::new(RecordStore::new(remote.clone())),
            teachers: Arc::new(RecordStore::new(remote)),
        }
    }
}

impl FromRef<AppState> for SharedStore<CourseFields> {
    fn from_ref(state: &AppState) -> Self {
        state.courses.clone()
    }
}

impl FromRef<AppState> for SharedStore<TeacherFields> {
    fn from_ref(state: &AppState) -> Self {
        state.teachers.clone()
    }
}
