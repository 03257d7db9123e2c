use serde::Serialize;
use serde_json::Value;

use service::query::PageLinks;

use crate::errors::ApiError;

/// Uniform response body: `{success, count?, pagination?, message?, data}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageLinks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self { success: true, count: None, pagination: None, message: None, data }
    }

    pub fn list(data: T, count: usize, pagination: PageLinks) -> Self {
        Self {
            success: true,
            count: Some(count),
            pagination: Some(pagination),
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Serialize a page of records so field projection can run on them.
pub fn serialize_page<T: Serialize>(rows: &[T]) -> Result<Vec<Value>, ApiError> {
    rows.iter()
        .map(|row| serde_json::to_value(row).map_err(|e| ApiError::bad_request(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_resource_envelope_omits_list_fields() {
        let body = serde_json::to_value(Envelope::data(serde_json::json!({"x": 1}))).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": {"x": 1}}));
    }

    #[test]
    fn list_envelope_always_carries_count_and_pagination() {
        let body = serde_json::to_value(Envelope::list(
            serde_json::json!([]),
            0,
            PageLinks::default(),
        ))
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": true, "count": 0, "pagination": {}, "data": []})
        );
    }
}
