use serde_json::json;

use crate::response::{ProxyResponse, http_status, lambda_response};

pub const STATUS_INFO_ENV: &str = "STATUS_INFO";

/// Answer with the baked-in status, or a note that there is none.
pub fn respond(status_info: Option<&str>) -> ProxyResponse {
    let body = match status_info {
        Some(info) => info.to_string(),
        None => json!({ "message": "No STATUS_INFO found on env" }).to_string(),
    };
    lambda_response(http_status::SUCCESS, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_status_info_verbatim() {
        let response = respond(Some(r#"{"deploymentTime":"2024-01-01T00:00:00.000Z"}"#));
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"deploymentTime":"2024-01-01T00:00:00.000Z"}"#);
    }

    #[test]
    fn explains_missing_status_info() {
        let response = respond(None);
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"message":"No STATUS_INFO found on env"}"#);
        assert_eq!(response.headers["content-type"], "application/json");
    }
}
