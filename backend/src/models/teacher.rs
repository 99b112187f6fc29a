use serde::{Deserialize, Serialize};

use super::record::{Kind, Payload, RecordFields};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherFields {
    pub name: String,
    pub job: String,
    pub desc: String,
}

impl RecordFields for TeacherFields {
    const KIND: Kind = Kind::Teacher;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("job", self.job.as_str()),
            ("desc", self.desc.as_str()),
        ]
    }

    fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            job: self.job.trim().to_string(),
            desc: self.desc.trim().to_string(),
        }
    }

    fn to_payload(&self) -> Payload {
        Payload::from([
            ("name".to_string(), self.name.clone()),
            ("job".to_string(), self.job.clone()),
            ("desc".to_string(), self.desc.clone()),
        ])
    }

    fn from_payload(payload: &Payload) -> Self {
        let get = |key: &str| payload.get(key).cloned().unwrap_or_default();
        Self {
            name: get("name"),
            job: get("job"),
            desc: get("desc"),
        }
    }
}
