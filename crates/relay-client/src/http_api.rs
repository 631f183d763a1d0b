//! HTTP implementation of the `ChatApi` port
//!
//! Thin request/response plumbing over `reqwest`. Every call attaches the
//! injected bearer credential and maps failures into the `ApiError`
//! taxonomy; server error payloads are carried opaquely.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use relay_common::ApiConfig;
use relay_core::{
    ApiError, ApiResult, Bookmark, BookmarkId, ChatApi, Conversation, ConversationId,
    ConversationOutcome, CreateConversation, Message, MessageId, MessagePage, OutgoingMessage,
    PinState, PostedMessage, ReactionToggle, ReadReceipt,
};

/// Structured error payload returned by the collaborator API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReactionRequest<'a> {
    emoji: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PinRequest {
    pinned: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinResponse {
    #[serde(default)]
    pinned: Option<PinState>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookmarkRequest<'a> {
    message_id: &'a MessageId,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConversationResponse {
    conversation: Conversation,
    #[serde(default)]
    existing: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MentionCountResponse {
    count: u64,
}

/// `ChatApi` over HTTP with bearer authentication
pub struct HttpChatApi {
    http: Client,
    base_url: String,
    bearer_token: String,
}

impl HttpChatApi {
    /// Build a client from configuration
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::transient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and map the response status into the error taxonomy.
    /// `resource`/`id` give NotFound errors a useful identity.
    async fn send(
        &self,
        request: RequestBuilder,
        resource: &'static str,
        id: &str,
    ) -> ApiResult<reqwest::Response> {
        let response = request
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or(ErrorBody {
            code: String::new(),
            message: String::new(),
        });
        debug!(status = status.as_u16(), code = %body.code, "API request failed");
        Err(map_error_status(status, body, resource, id))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &'static str,
        id: &str,
    ) -> ApiResult<T> {
        self.send(request, resource, id)
            .await?
            .json::<T>()
            .await
            .map_err(map_transport_error)
    }
}

fn map_transport_error(err: reqwest::Error) -> ApiError {
    ApiError::transient(err.to_string())
}

fn map_error_status(
    status: StatusCode,
    body: ErrorBody,
    resource: &'static str,
    id: &str,
) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::not_found(resource, id),
        StatusCode::CONFLICT => ApiError::Conflict(if body.message.is_empty() {
            body.code
        } else {
            body.message
        }),
        s if s.is_server_error() => ApiError::transient(format!("server error {}", s.as_u16())),
        s => ApiError::Api {
            status: s.as_u16(),
            code: if body.code.is_empty() {
                "UNKNOWN".to_string()
            } else {
                body.code
            },
        },
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    #[instrument(skip(self))]
    async fn fetch_messages(
        &self,
        conversation: Option<&ConversationId>,
        before: Option<&MessageId>,
        limit: u32,
    ) -> ApiResult<MessagePage> {
        let mut request = self
            .http
            .get(self.url("/messages"))
            .query(&[("limit", limit.to_string())]);
        if let Some(conversation) = conversation {
            request = request.query(&[("conversationId", conversation.as_str())]);
        }
        if let Some(before) = before {
            request = request.query(&[("before", before.as_str())]);
        }
        self.get_json(request, "Conversation", "messages").await
    }

    #[instrument(skip(self, outgoing), fields(temp_id = %outgoing.temp_id))]
    async fn post_message(&self, outgoing: &OutgoingMessage) -> ApiResult<PostedMessage> {
        let request = self.http.post(self.url("/messages")).json(outgoing);
        self.get_json(request, "Conversation", "messages").await
    }

    #[instrument(skip(self))]
    async fn delete_message(&self, id: &MessageId) -> ApiResult<()> {
        let request = self.http.delete(self.url(&format!("/messages/{id}")));
        self.send(request, "Message", id.as_str()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn toggle_reaction(&self, id: &MessageId, emoji: &str) -> ApiResult<ReactionToggle> {
        let request = self
            .http
            .post(self.url(&format!("/messages/{id}/reactions")))
            .json(&ReactionRequest { emoji });
        self.get_json(request, "Message", id.as_str()).await
    }

    #[instrument(skip(self))]
    async fn set_pin(&self, id: &MessageId, pinned: bool) -> ApiResult<Option<PinState>> {
        let request = self
            .http
            .post(self.url(&format!("/messages/{id}/pin")))
            .json(&PinRequest { pinned });
        let response: PinResponse = self.get_json(request, "Message", id.as_str()).await?;
        Ok(response.pinned)
    }

    #[instrument(skip(self))]
    async fn create_bookmark(&self, id: &MessageId, note: Option<&str>) -> ApiResult<Bookmark> {
        let request = self
            .http
            .post(self.url("/bookmarks"))
            .json(&BookmarkRequest {
                message_id: id,
                note,
            });
        self.get_json(request, "Message", id.as_str()).await
    }

    #[instrument(skip(self))]
    async fn list_bookmarks(&self) -> ApiResult<Vec<Bookmark>> {
        let request = self.http.get(self.url("/bookmarks"));
        self.get_json(request, "Bookmark", "all").await
    }

    #[instrument(skip(self))]
    async fn delete_bookmark(&self, id: &BookmarkId) -> ApiResult<()> {
        let request = self.http.delete(self.url(&format!("/bookmarks/{id}")));
        self.send(request, "Bookmark", id.as_str()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn post_read_receipt(&self, id: &MessageId) -> ApiResult<()> {
        let request = self.http.post(self.url(&format!("/messages/{id}/receipts")));
        self.send(request, "Message", id.as_str()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_read_receipts(&self, id: &MessageId) -> ApiResult<Vec<ReadReceipt>> {
        let request = self.http.get(self.url(&format!("/messages/{id}/receipts")));
        self.get_json(request, "Message", id.as_str()).await
    }

    #[instrument(skip(self))]
    async fn list_conversations(&self) -> ApiResult<Vec<Conversation>> {
        let request = self.http.get(self.url("/conversations"));
        self.get_json(request, "Conversation", "all").await
    }

    #[instrument(skip(self, request))]
    async fn create_conversation(
        &self,
        request: &CreateConversation,
    ) -> ApiResult<ConversationOutcome> {
        let req = self.http.post(self.url("/conversations")).json(request);
        let response: ConversationResponse = self.get_json(req, "Conversation", "new").await?;
        Ok(if response.existing {
            ConversationOutcome::Existing(response.conversation)
        } else {
            ConversationOutcome::Created(response.conversation)
        })
    }

    #[instrument(skip(self))]
    async fn mark_conversation_read(&self, id: &ConversationId) -> ApiResult<()> {
        let request = self.http.put(self.url(&format!("/conversations/{id}/read")));
        self.send(request, "Conversation", id.as_str()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn unread_mention_count(&self) -> ApiResult<u64> {
        let request = self.http.get(self.url("/mentions/unread-count"));
        let response: MentionCountResponse = self.get_json(request, "Mentions", "count").await?;
        Ok(response.count)
    }
}
