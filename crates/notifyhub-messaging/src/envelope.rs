//! Wire envelope and typed request payloads.
//!
//! Every message on the broker is a JSON object:
//!
//! ```json
//! {"id": "...", "message_type": "find_user_by_id", "message_data": {...}, "reply_to": "queue"}
//! ```
//!
//! Replies reuse the request `id` and carry `message_type = "reply"`.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use notifyhub_core::error::{AppError, ErrorKind};
use notifyhub_core::result::AppResult;

/// Message type tag carried by every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageType {
    /// Resolve a user's display summary.
    FindUserById,
    /// Fetch a user's full profile.
    GetUserMe,
    /// Count a user's unread notifications.
    CountUnreadNotifications,
    /// Answer to an earlier request.
    Reply,
    /// Any tag this service does not know.
    Unknown(String),
}

impl MessageType {
    /// Return the wire tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::FindUserById => "find_user_by_id",
            Self::GetUserMe => "get_user_me",
            Self::CountUnreadNotifications => "count_unread_notifications",
            Self::Reply => "reply",
            Self::Unknown(tag) => tag,
        }
    }
}

impl From<String> for MessageType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "find_user_by_id" => Self::FindUserById,
            "get_user_me" => Self::GetUserMe,
            "count_unread_notifications" => Self::CountUnreadNotifications,
            "reply" => Self::Reply,
            _ => Self::Unknown(tag),
        }
    }
}

impl From<MessageType> for String {
    fn from(kind: MessageType) -> Self {
        match kind {
            MessageType::Unknown(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One broker message, request or reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Correlation id shared by a request and its reply.
    pub id: String,
    /// Type tag.
    pub message_type: MessageType,
    /// Payload object.
    #[serde(default)]
    pub message_data: Map<String, Value>,
    /// Queue the reply must be published to. Empty on replies.
    #[serde(default)]
    pub reply_to: String,
}

impl Envelope {
    /// Build a request envelope.
    pub fn request(
        id: impl Into<String>,
        message_type: MessageType,
        message_data: Map<String, Value>,
        reply_to: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            message_type,
            message_data,
            reply_to: reply_to.into(),
        }
    }

    /// Build the reply to a request with the given id.
    pub fn reply(id: impl Into<String>, message_data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            message_type: MessageType::Reply,
            message_data,
            reply_to: String::new(),
        }
    }

    /// Build the reply `{"error": message}`.
    pub fn error_reply(id: impl Into<String>, message: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert("error".to_string(), Value::String(message.into()));
        Self::reply(id, data)
    }

    /// Whether this envelope is tagged as a reply.
    pub fn is_reply(&self) -> bool {
        self.message_type == MessageType::Reply
    }

    /// The `error` field of a reply, if present.
    pub fn error_message(&self) -> Option<String> {
        self.message_data.get("error").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Decode the payload into a typed struct.
    pub fn decode_data<T: DeserializeOwned>(&self) -> AppResult<T> {
        serde_json::from_value(Value::Object(self.message_data.clone())).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Invalid {} payload: {e}", self.message_type),
                e,
            )
        })
    }

    /// Parse an envelope from raw broker bytes.
    pub fn from_bytes(body: &[u8]) -> AppResult<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Serialize to broker bytes.
    pub fn to_bytes(&self) -> AppResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Payload of `find_user_by_id` and `get_user_me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdPayload {
    pub user_id: Uuid,
}

/// Payload of `count_unread_notifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountUnreadPayload {
    pub user_id: Uuid,
    #[serde(default)]
    pub application: String,
}

/// Typed request this service sends or answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerRequest {
    FindUserById(UserIdPayload),
    GetUserMe(UserIdPayload),
    CountUnreadNotifications(CountUnreadPayload),
}

impl BrokerRequest {
    /// Tag for the envelope.
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::FindUserById(_) => MessageType::FindUserById,
            Self::GetUserMe(_) => MessageType::GetUserMe,
            Self::CountUnreadNotifications(_) => MessageType::CountUnreadNotifications,
        }
    }

    /// Encode the payload as an envelope data object.
    pub fn into_data(self) -> AppResult<Map<String, Value>> {
        let value = match self {
            Self::FindUserById(p) | Self::GetUserMe(p) => serde_json::to_value(p)?,
            Self::CountUnreadNotifications(p) => serde_json::to_value(p)?,
        };
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::new(
                ErrorKind::Serialization,
                "Request payload is not a JSON object",
            )),
        }
    }

    /// Decode a typed request from an inbound envelope.
    pub fn decode(envelope: &Envelope) -> AppResult<Self> {
        match &envelope.message_type {
            MessageType::FindUserById => Ok(Self::FindUserById(envelope.decode_data()?)),
            MessageType::GetUserMe => Ok(Self::GetUserMe(envelope.decode_data()?)),
            MessageType::CountUnreadNotifications => {
                Ok(Self::CountUnreadNotifications(envelope.decode_data()?))
            }
            other => Err(AppError::validation(format!(
                "'{other}' is not a request type"
            ))),
        }
    }
}
