// Driftchat Core — Wire Protocol
//
// The request/response contract between widget and gateway. Field names are
// camelCase on the wire; the optional page-context fields are advisory and
// must never be required for a request to succeed.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        ChatRequest {
            message: message.into(),
            page_path: None,
            page_title: None,
            page_url: None,
        }
    }
}

/// Body of every gateway response, success or failure. The shape never
/// varies by outcome; only the HTTP status code does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

impl ChatResponse {
    pub fn new(reply: impl Into<String>) -> Self {
        ChatResponse { reply: reply.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_context_fields_are_camel_case() {
        let mut req = ChatRequest::new("hi");
        req.page_path = Some("/about".into());
        req.page_title = Some("About".into());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["message"], "hi");
        assert_eq!(json["pagePath"], "/about");
        assert_eq!(json["pageTitle"], "About");
        assert!(json.get("pageUrl").is_none(), "absent context must be omitted, not null");
    }

    #[test]
    fn request_parses_with_message_only() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hello"}"#).unwrap();
        assert_eq!(req.message, "hello");
        assert!(req.page_path.is_none());
    }

    #[test]
    fn request_ignores_unknown_fields() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"message":"hello","model":"gpt-9","temperature":2.0}"#)
                .unwrap();
        assert_eq!(req.message, "hello");
    }

    #[test]
    fn response_is_reply_only() {
        let json = serde_json::to_string(&ChatResponse::new("ok")).unwrap();
        assert_eq!(json, r#"{"reply":"ok"}"#);
    }
}
