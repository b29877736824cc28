use serde::{Deserialize, Serialize};

/// Response of `GET /api/v1/auth/config` on the receipt service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfigResponse {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

/// Error body returned by the receipt service
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_detail() {
        let body: ApiErrorBody = serde_json::from_value(json!({ "detail": "Not found" })).unwrap();
        assert_eq!(body.detail.as_deref(), Some("Not found"));
    }

    #[test]
    fn test_error_body_without_detail() {
        let body: ApiErrorBody = serde_json::from_value(json!({ "message": "nope" })).unwrap();
        assert!(body.detail.is_none());
    }
}
