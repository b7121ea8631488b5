use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/students` and `PUT /api/students/:id`. Fields stay raw
/// JSON so wrongly typed values reach validation instead of the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct StudentPayload {
    #[serde(default)]
    pub student_code: Option<Value>,
    #[serde(default)]
    pub full_name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub dob: Option<Value>,
    #[serde(default)]
    pub class_name: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
}
