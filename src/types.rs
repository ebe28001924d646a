// Alleria Notify Type Definitions
//
// Shared data structures handed between the dispatcher, the policy table
// and the host adapters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options handed to the host notification tray.
///
/// Field names follow the browser `showNotification` options so a web host
/// can forward the serialized object untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationOptions {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Dedupe key, a shown notification with the same tag is replaced.
    pub tag: String,
    /// Alternating vibrate/pause durations in milliseconds.
    pub vibrate: Vec<u32>,
    pub require_interaction: bool,
    pub actions: Vec<NotificationAction>,
    /// Carried through to the click handler.
    pub data: Map<String, Value>,
}

impl PresentationOptions {
    /// Total vibration time in milliseconds (pauses included)
    pub fn vibration_energy(&self) -> u32 {
        self.vibrate.iter().sum()
    }

    /// Click target carried in `data.url`, if any
    pub fn target_url(&self) -> Option<&str> {
        self.data.get("url").and_then(Value::as_str)
    }
}

/// A button rendered on the notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

pub const ACTION_VIEW: &str = "view";
pub const ACTION_DISMISS: &str = "dismiss";

/// A page context the host currently has open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientWindow {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub focused: bool,
}

impl ClientWindow {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            focused: false,
        }
    }
}

/// Push subscription as reported by the host subscription manager
/// (the `PushSubscription.toJSON()` shape)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDescriptor {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<u64>,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Get current Unix timestamp in milliseconds
pub fn current_timestamp_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_serialize_with_browser_names() {
        let options = PresentationOptions {
            title: "t".to_string(),
            body: "b".to_string(),
            icon: "/i.png".to_string(),
            badge: "/b.png".to_string(),
            tag: "restaurant-notification".to_string(),
            vibrate: vec![200, 100, 200],
            require_interaction: true,
            actions: vec![NotificationAction {
                action: ACTION_DISMISS.to_string(),
                title: "Cerrar".to_string(),
                icon: None,
            }],
            data: Map::new(),
        };

        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(value["requireInteraction"], json!(true));
        assert_eq!(value["actions"][0], json!({"action": "dismiss", "title": "Cerrar"}));
        assert_eq!(options.vibration_energy(), 500);
    }

    #[test]
    fn test_subscription_descriptor_shape() {
        let raw = json!({
            "endpoint": "https://push.example/abc",
            "expirationTime": null,
            "keys": {"p256dh": "key", "auth": "secret"}
        });
        let sub: SubscriptionDescriptor = serde_json::from_value(raw).unwrap();
        assert_eq!(sub.keys.auth, "secret");
        assert_eq!(sub.expiration_time, None);
    }
}
