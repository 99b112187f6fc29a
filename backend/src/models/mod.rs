pub mod course;
pub mod record;
pub mod teacher;

pub use course::CourseFields;
pub use record::{Draft, ImageFile, Kind, Payload, Record, RecordFields, RecordId, IMAGE_URL_KEY};
pub use teacher::TeacherFields;
