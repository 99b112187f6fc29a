pub mod record_store;
pub mod scheduler;

pub use record_store::{RecordForm, RecordStore, SubmitMode, SubmitOutcome};
pub use scheduler::{RefreshScheduler, RefreshStats, refresh_all};
