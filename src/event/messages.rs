// Page Messages
//
// Wire shapes exchanged with open pages:
// - SHOW_NOTIFICATION / GET_SUBSCRIPTION requests
// - {success, error?} and SUBSCRIPTION_INFO / SUBSCRIPTION_ERROR replies
// - PUSH_RECEIVED broadcast
//

use crate::error::RequestError;
use crate::types::SubscriptionDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Request posted by a page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum PageMessage {
    /// Show a notification without going through push
    #[serde(rename = "SHOW_NOTIFICATION")]
    ShowNotification {
        #[serde(default)]
        data: Value,
    },
    /// Report the current push subscription
    #[serde(rename = "GET_SUBSCRIPTION")]
    GetSubscription {},
}

impl PageMessage {
    /// Decode a page message; anything unrecognized is `None`
    pub fn decode(raw: &[u8]) -> Option<PageMessage> {
        match serde_json::from_slice::<PageMessage>(raw) {
            Ok(message) => Some(message),
            Err(e) => {
                debug!("[PageMessage] Ignoring unrecognized message: {}", e);
                None
            }
        }
    }
}

/// Validated `data` of a SHOW_NOTIFICATION request
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShowRequest {
    pub title: String,
    pub body: Option<String>,
    pub mesa: Option<String>,
    pub vibrate: Option<Vec<u32>>,
    pub tag: Option<String>,
    pub require_interaction: Option<bool>,
}

impl ShowRequest {
    pub fn from_data(data: &Value) -> Result<ShowRequest, RequestError> {
        let fields = data.as_object().ok_or(RequestError::MissingData)?;

        let title = match present(fields, "title") {
            None => return Err(RequestError::MissingField("title")),
            Some(Value::String(title)) if title.trim().is_empty() => {
                return Err(RequestError::MissingField("title"))
            }
            Some(Value::String(title)) => title.clone(),
            Some(_) => return Err(invalid("title", "a string")),
        };

        let body = match present(fields, "body") {
            None => None,
            Some(Value::String(body)) => Some(body.clone()),
            Some(_) => return Err(invalid("body", "a string")),
        };

        let mesa = match present(fields, "mesa") {
            None => None,
            Some(Value::String(mesa)) => Some(mesa.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(_) => return Err(invalid("mesa", "a string or number")),
        };

        let vibrate = match present(fields, "vibrate") {
            None => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|item| item.as_u64().and_then(|ms| u32::try_from(ms).ok()))
                    .collect::<Option<Vec<u32>>>()
                    .ok_or_else(|| invalid("vibrate", "an array of durations in milliseconds"))?,
            ),
            Some(_) => return Err(invalid("vibrate", "an array of durations in milliseconds")),
        };

        let tag = match present(fields, "tag") {
            None => None,
            Some(Value::String(tag)) if !tag.is_empty() => Some(tag.clone()),
            Some(_) => return Err(invalid("tag", "a non-empty string")),
        };

        let require_interaction = match present(fields, "requireInteraction") {
            None => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(_) => return Err(invalid("requireInteraction", "a boolean")),
        };

        Ok(ShowRequest {
            title,
            body,
            mesa,
            vibrate,
            tag,
            require_interaction,
        })
    }
}

/// Field value, treating `null` as absent
fn present<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|value| !value.is_null())
}

fn invalid(field: &'static str, expected: &'static str) -> RequestError {
    RequestError::InvalidField { field, expected }
}

/// Reply to a SHOW_NOTIFICATION request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ShowReply {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
        }
    }
}

/// Reply to a GET_SUBSCRIPTION request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SubscriptionReply {
    #[serde(rename = "SUBSCRIPTION_INFO")]
    Info {
        subscription: Option<SubscriptionDescriptor>,
    },
    #[serde(rename = "SUBSCRIPTION_ERROR")]
    Error { error: String },
}

/// Anything sent back over a page's response channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PageReply {
    Show(ShowReply),
    Subscription(SubscriptionReply),
}

/// Fire-and-forget message broadcast to every open page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "PUSH_RECEIVED")]
    PushReceived {
        data: Value,
        timestamp: u64,
        success: bool,
    },
}

impl ClientMessage {
    /// Event name used by hosts that route messages by name
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::PushReceived { .. } => "PUSH_RECEIVED",
        }
    }
}
