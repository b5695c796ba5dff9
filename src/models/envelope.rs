use serde::{Deserialize, Serialize};

/// Uniform response body: `{success, data?, message?, count?, error?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            count: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let count = items.len();
        Self {
            count: Some(count),
            ..Self::data(items)
        }
    }
}

impl Envelope<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            count: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            count: None,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_carries_count() {
        let json = serde_json::to_value(Envelope::list(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 3);
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    #[test]
    fn decodes_without_data() {
        let envelope: Envelope<Named> =
            serde_json::from_str(r#"{"success":false,"message":"Company not found"}"#).unwrap();
        assert!(envelope.data.is_none());
        assert_eq!(envelope.message.as_deref(), Some("Company not found"));

        let envelope: Envelope<Named> =
            serde_json::from_str(r#"{"success":true,"data":{"name":"Bella"}}"#).unwrap();
        assert_eq!(envelope.data, Some(Named { name: "Bella".to_string() }));
    }

    #[test]
    fn failure_omits_data() {
        let json = serde_json::to_value(Envelope::failure("Company not found", None)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Company not found");
        assert!(json.get("data").is_none());
        assert!(json.get("error").is_none());
    }
}
