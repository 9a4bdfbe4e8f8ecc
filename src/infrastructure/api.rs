//! Typed client for the chat backend's REST API
//!
//! The backend is the sole source of truth; this client is a thin
//! wrapper that decodes its payloads and normalizes its failures into
//! [`ApiError`]. Pagination metadata is decoded as optional throughout —
//! deriving missing fields is the merge engine's job, not a reason to
//! fail a request.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::core::state::pagination::MessagePage;
use crate::domain::{Liveness, Message, ThreadId};

/// Failures talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 429: the viewer's message quota is exhausted.
    #[error("{message}")]
    QuotaExceeded { message: String },

    /// HTTP 401: the session is gone; the caller must re-authenticate.
    #[error("{message}")]
    Unauthorized { message: String },

    /// Any other non-success status, with the server's error text where
    /// the body carried one.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Connection/TLS/decode failures below the HTTP layer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// User-facing text for a failed send. Quota exhaustion gets a
    /// friendly, distinct message; everything else passes the server's
    /// error text through verbatim.
    pub fn send_failure_message(&self) -> String {
        match self {
            ApiError::QuotaExceeded { .. } => {
                "Your weekly message limit has been reached.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Extract a human-readable message from a backend error body.
///
/// Recognized shapes: `{"detail": "..."}`; `{"detail": [{"msg": "..."}]}`
/// (validation errors); `{"error": "..."}`. Anything else falls back to
/// a status line.
fn extract_error_message(data: Option<&Value>, status: u16) -> String {
    if let Some(data) = data {
        if let Some(detail) = data.get("detail") {
            if let Some(text) = detail.as_str() {
                return text.to_string();
            }
            if let Some(first) = detail.as_array().and_then(|entries| entries.first()) {
                if let Some(msg) = first.get("msg").and_then(Value::as_str) {
                    return msg.to_string();
                }
            }
        }
        if let Some(text) = data.get("error").and_then(Value::as_str) {
            return text.to_string();
        }
    }

    format!("Request failed with status {status}")
}

#[derive(Debug, Deserialize)]
struct RoomDetailDto {
    #[serde(default)]
    is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RoomParticipantDto {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct RoomParticipantsDto {
    #[serde(default)]
    participants: Vec<RoomParticipantDto>,
}

#[derive(Debug, Deserialize)]
struct ConversationPermissionsDto {
    #[serde(default = "default_true")]
    can_post: bool,
}

impl Default for ConversationPermissionsDto {
    fn default() -> Self {
        // Absent permissions mean the backend predates the field; trust
        // its own enforcement rather than locking the viewer out.
        Self { can_post: true }
    }
}

#[derive(Debug, Deserialize)]
struct ConversationDetailDto {
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    permissions: Option<ConversationPermissionsDto>,
}

fn default_true() -> bool {
    true
}

/// Async REST client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder().use_rustls_tls().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// `GET <thread>/messages?page=N&page_size=M`
    pub async fn fetch_messages(
        &self,
        thread: ThreadId,
        page: u32,
        page_size: u32,
    ) -> Result<MessagePage, ApiError> {
        let response = self
            .client
            .get(self.url(&thread.messages_path()))
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await?;
        read_json(response).await
    }

    /// `POST <thread>/messages` — returns the server-confirmed message.
    pub async fn send_message(&self, thread: ThreadId, content: &str) -> Result<Message, ApiError> {
        let response = self
            .client
            .post(self.url(&thread.messages_path()))
            .json(&json!({ "content": content }))
            .send()
            .await?;
        read_json(response).await
    }

    /// Snapshot the viewer's standing in a thread.
    ///
    /// Rooms report activity on the detail resource and membership via
    /// the participant list (when a viewer id is known; without one the
    /// backend's own enforcement is trusted). Conversations carry both
    /// on the detail resource; a 403/404 there means the viewer is not
    /// a participant, which is a liveness answer, not an error.
    pub async fn fetch_liveness(
        &self,
        thread: ThreadId,
        viewer_id: Option<i64>,
    ) -> Result<Liveness, ApiError> {
        match thread {
            ThreadId::Room(_) => {
                let detail: RoomDetailDto = match self.get_json(&thread.detail_path()).await {
                    Ok(detail) => detail,
                    Err(err) if is_membership_denial(&err) => {
                        return Ok(Liveness::new(false, false));
                    }
                    Err(err) => return Err(err),
                };

                let participants_path = format!("{}/participants", thread.detail_path());
                let participants: RoomParticipantsDto =
                    self.get_json(&participants_path).await?;

                let is_member = match viewer_id {
                    Some(viewer) => participants
                        .participants
                        .iter()
                        .any(|participant| participant.id == viewer),
                    None => true,
                };

                Ok(Liveness::new(is_member, detail.is_active.unwrap_or(true)))
            }
            ThreadId::Conversation(_) => {
                let detail: ConversationDetailDto = match self
                    .get_json(&thread.detail_path())
                    .await
                {
                    Ok(detail) => detail,
                    Err(err) if is_membership_denial(&err) => {
                        return Ok(Liveness::new(false, false));
                    }
                    Err(err) => return Err(err),
                };

                let can_post = detail.permissions.unwrap_or_default().can_post;
                Ok(Liveness::new(can_post, detail.is_active.unwrap_or(true)))
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.client.get(self.url(path)).send().await?;
        read_json(response).await
    }
}

fn is_membership_denial(err: &ApiError) -> bool {
    matches!(
        err,
        ApiError::Api {
            status: 403 | 404,
            ..
        }
    )
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let payload: Option<Value> = response.json().await.ok();
    let message = extract_error_message(payload.as_ref(), status.as_u16());

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized { message },
        StatusCode::TOO_MANY_REQUESTS => ApiError::QuotaExceeded { message },
        other => ApiError::Api {
            status: other.as_u16(),
            message,
        },
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extract_error_message_detail_string() {
        let body = json!({ "detail": "Room is archived" });
        assert_eq!(extract_error_message(Some(&body), 400), "Room is archived");
    }

    #[test]
    fn test_extract_error_message_validation_list() {
        let body = json!({ "detail": [{ "msg": "content too long", "loc": ["body"] }] });
        assert_eq!(extract_error_message(Some(&body), 422), "content too long");
    }

    #[test]
    fn test_extract_error_message_error_field() {
        let body = json!({ "error": "nope" });
        assert_eq!(extract_error_message(Some(&body), 500), "nope");
    }

    #[test]
    fn test_extract_error_message_fallback() {
        assert_eq!(
            extract_error_message(None, 502),
            "Request failed with status 502"
        );
        let body = json!({ "unexpected": true });
        assert_eq!(
            extract_error_message(Some(&body), 418),
            "Request failed with status 418"
        );
    }

    #[test]
    fn test_send_failure_message_maps_quota() {
        let err = ApiError::QuotaExceeded {
            message: "Rate limit exceeded".to_string(),
        };
        assert_eq!(
            err.send_failure_message(),
            "Your weekly message limit has been reached."
        );
    }

    #[test]
    fn test_send_failure_message_passes_server_text_through() {
        let err = ApiError::Api {
            status: 400,
            message: "Room is read-only".to_string(),
        };
        assert_eq!(err.send_failure_message(), "Room is read-only");
    }

    #[test]
    fn test_conversation_detail_defaults() {
        let detail: ConversationDetailDto = serde_json::from_value(json!({})).expect("valid");
        assert_eq!(detail.is_active, None);
        assert!(detail.permissions.is_none());

        let detail: ConversationDetailDto = serde_json::from_value(json!({
            "is_active": false,
            "permissions": { "can_post": false, "can_leave": true }
        }))
        .expect("valid");
        assert_eq!(detail.is_active, Some(false));
        assert!(!detail.permissions.expect("present").can_post);
    }

    #[test]
    fn test_client_normalizes_base_url() {
        let client = ApiClient::new("http://example.test/api/").expect("client builds");
        assert_eq!(
            client.url("rooms/3/messages"),
            "http://example.test/api/rooms/3/messages"
        );
    }

    #[test]
    fn test_membership_denial_detection() {
        assert!(is_membership_denial(&ApiError::Api {
            status: 403,
            message: String::new()
        }));
        assert!(is_membership_denial(&ApiError::Api {
            status: 404,
            message: String::new()
        }));
        assert!(!is_membership_denial(&ApiError::Api {
            status: 500,
            message: String::new()
        }));
        assert!(!is_membership_denial(&ApiError::Unauthorized {
            message: String::new()
        }));
    }
}
