use serde::{Deserialize, Serialize};

use super::record::{Kind, Payload, RecordFields};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseFields {
    pub name: String,
    pub brief: String,
    pub detailed: String,
    pub price: String,
}

impl RecordFields for CourseFields {
    const KIND: Kind = Kind::Course;

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("name", self.name.as_str()),
            ("brief", self.brief.as_str()),
            ("detailed", self.detailed.as_str()),
        ]
    }

    fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            brief: self.brief.trim().to_string(),
            detailed: self.detailed.trim().to_string(),
            price: self.price.trim().to_string(),
        }
    }

    fn to_payload(&self) -> Payload {
        Payload::from([
            ("name".to_string(), self.name.clone()),
            ("brief".to_string(), self.brief.clone()),
            ("detailed".to_string(), self.detailed.clone()),
            ("price".to_string(), self.price.clone()),
        ])
    }

    fn from_payload(payload: &Payload) -> Self {
        let get = |key: &str| payload.get(key).cloned().unwrap_or_default();
        Self {
            name: get("name"),
            brief: get("brief"),
            detailed: get("detailed"),
            price: get("price"),
        }
    }
}
