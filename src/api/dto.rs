//! REST API request/response data transfer objects

use serde::{Deserialize, Deserializer, Serialize};

/// Cover upload request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeRequest {
    /// HTTP(S) URL, data URI, or bare base64
    #[serde(default)]
    pub image_data: String,
    /// Record the cover belongs to; `businessId` accepted for older clients
    #[serde(default, alias = "businessId", deserialize_with = "string_or_number")]
    pub identifier: String,
}

/// Record ids may arrive as JSON numbers
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Cover upload response
#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub success: bool,
    pub url: String,
    pub message: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub format: String,
    pub uptime_seconds: u64,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

impl ErrorResponse {
    pub fn new(error: &str, details: &str) -> Self {
        Self {
            error: error.to_string(),
            details: details.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accepts_both_identifier_names() {
        let a: NormalizeRequest =
            serde_json::from_str(r#"{"imageData":"abc","identifier":"biz-1"}"#).unwrap();
        let b: NormalizeRequest =
            serde_json::from_str(r#"{"imageData":"abc","businessId":"biz-1"}"#).unwrap();
        assert_eq!(a.identifier, "biz-1");
        assert_eq!(b.identifier, "biz-1");
        assert_eq!(b.image_data, "abc");
    }

    #[test]
    fn test_numeric_identifier() {
        let req: NormalizeRequest =
            serde_json::from_str(r#"{"imageData":"abc","businessId":42}"#).unwrap();
        assert_eq!(req.identifier, "42");
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let req: NormalizeRequest = serde_json::from_str("{}").unwrap();
        assert!(req.image_data.is_empty());
        assert!(req.identifier.is_empty());
    }
}
