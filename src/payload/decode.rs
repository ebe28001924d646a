// Push Payload Decoding
//
// Turns raw push bytes into PushContent. Decoding never fails: a payload
// that is not a JSON object becomes plain display text, and a missing or
// blank payload becomes Absent.
//

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Minutes announced by a `preaviso` that does not say
pub const DEFAULT_MINUTES: u32 = 5;

/// Notification type selected by the payload `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The customer's table is ready
    TurnoListo,
    /// The turn is a few minutes away
    Preaviso,
    /// Staff are calling the customer to a table
    LlamadaMesa,
    #[default]
    Other,
}

impl NotificationKind {
    /// Exact match on the wire name; anything else is `Other`
    pub fn from_type_str(raw: &str) -> Self {
        match raw {
            "turno_listo" => NotificationKind::TurnoListo,
            "preaviso" => NotificationKind::Preaviso,
            "llamada_mesa" => NotificationKind::LlamadaMesa,
            _ => NotificationKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::TurnoListo => "turno_listo",
            NotificationKind::Preaviso => "preaviso",
            NotificationKind::LlamadaMesa => "llamada_mesa",
            NotificationKind::Other => "other",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured push payload sent by the queue backend
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NotificationPayload {
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: NotificationKind,
    /// Table identifier; the backend sends integers, pages may send strings
    #[serde(default, deserialize_with = "lenient_id")]
    pub mesa: Option<String>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub minutos: Option<u32>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub body: Option<String>,
    /// Click target override
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    /// Unrecognized fields, passed through to the click-time data bag
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// The object exactly as the backend sent it
    #[serde(skip)]
    pub raw: Map<String, Value>,
}

impl NotificationPayload {
    /// Announced minutes, `DEFAULT_MINUTES` when absent
    pub fn minutes(&self) -> u32 {
        self.minutos.unwrap_or(DEFAULT_MINUTES)
    }
}

/// What a push event carried
#[derive(Debug, Clone, PartialEq)]
pub enum PushContent {
    Structured(NotificationPayload),
    /// Present but not a JSON object
    Text(String),
    Absent,
}

impl PushContent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            PushContent::Structured(payload) => payload.kind,
            _ => NotificationKind::Other,
        }
    }

    /// Payload as broadcast to open pages; structured pushes go out unchanged
    pub fn to_value(&self) -> Value {
        match self {
            PushContent::Structured(payload) => Value::Object(payload.raw.clone()),
            PushContent::Text(text) => serde_json::json!({
                "type": NotificationKind::Other,
                "body": text,
            }),
            PushContent::Absent => serde_json::json!({ "type": NotificationKind::Other }),
        }
    }
}

/// Decode raw push bytes
pub fn decode_push(raw: Option<&[u8]>) -> PushContent {
    let Some(bytes) = raw else {
        debug!("[PayloadDecoder] Push without payload");
        return PushContent::Absent;
    };

    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        debug!("[PayloadDecoder] Push with blank payload");
        return PushContent::Absent;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(object)) => match NotificationPayload::deserialize(&Value::Object(object.clone())) {
            Ok(mut payload) => {
                debug!("[PayloadDecoder] Structured payload of type {}", payload.kind);
                payload.raw = object;
                PushContent::Structured(payload)
            }
            Err(e) => {
                warn!("[PayloadDecoder] JSON object did not decode ({}), using it as text", e);
                PushContent::Text(trimmed.to_string())
            }
        },
        Ok(Value::String(inner)) if !inner.trim().is_empty() => {
            PushContent::Text(inner.trim().to_string())
        }
        Ok(_) | Err(_) => {
            debug!("[PayloadDecoder] Non-object payload, falling back to text");
            PushContent::Text(trimmed.to_string())
        }
    }
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<NotificationKind, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => NotificationKind::from_type_str(&raw),
        _ => NotificationKind::Other,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|m| *m >= 0.0 && m.fract() == 0.0).map(|m| m as u64))
            .and_then(|m| u32::try_from(m).ok()),
        Value::String(raw) => raw.trim().parse::<u32>().ok(),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) if !raw.trim().is_empty() => Some(raw),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(raw: &str) -> NotificationPayload {
        match decode_push(Some(raw.as_bytes())) {
            PushContent::Structured(payload) => payload,
            other => panic!("expected structured payload, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_known_types() {
        assert_eq!(structured(r#"{"type":"turno_listo","mesa":4}"#).kind, NotificationKind::TurnoListo);
        assert_eq!(structured(r#"{"type":"preaviso"}"#).kind, NotificationKind::Preaviso);
        assert_eq!(structured(r#"{"type":"llamada_mesa"}"#).kind, NotificationKind::LlamadaMesa);
    }

    #[test]
    fn test_unknown_or_missing_type_is_other() {
        assert_eq!(structured(r#"{"type":"TURNO_LISTO"}"#).kind, NotificationKind::Other);
        assert_eq!(structured(r#"{"type":7}"#).kind, NotificationKind::Other);
        assert_eq!(structured(r#"{"title":"Hola"}"#).kind, NotificationKind::Other);
    }

    #[test]
    fn test_mesa_accepts_numbers_and_strings() {
        assert_eq!(structured(r#"{"mesa":3}"#).mesa.as_deref(), Some("3"));
        assert_eq!(structured(r#"{"mesa":" A2 "}"#).mesa.as_deref(), Some("A2"));
        assert_eq!(structured(r#"{"mesa":[1]}"#).mesa, None);
    }

    #[test]
    fn test_minutes_default_and_coercion() {
        assert_eq!(structured(r#"{"type":"preaviso"}"#).minutes(), DEFAULT_MINUTES);
        assert_eq!(structured(r#"{"type":"preaviso","minutos":3}"#).minutes(), 3);
        assert_eq!(structured(r#"{"type":"preaviso","minutos":"10"}"#).minutes(), 10);
        assert_eq!(structured(r#"{"type":"preaviso","minutos":-2}"#).minutes(), DEFAULT_MINUTES);
        assert_eq!(structured(r#"{"type":"preaviso","minutos":3.0}"#).minutes(), 3);
        assert_eq!(structured(r#"{"type":"preaviso","minutos":2.5}"#).minutes(), DEFAULT_MINUTES);
    }

    #[test]
    fn test_extra_fields_are_kept() {
        let payload = structured(r#"{"type":"turno_listo","mesa":2,"cliente_id":17,"url":"/cliente?x=1"}"#);
        assert_eq!(payload.extra.get("cliente_id"), Some(&json!(17)));
        assert_eq!(payload.url.as_deref(), Some("/cliente?x=1"));
        assert!(!payload.extra.contains_key("type"));
    }

    #[test]
    fn test_text_and_absent_fallbacks() {
        assert_eq!(decode_push(None), PushContent::Absent);
        assert_eq!(decode_push(Some(b"  \n")), PushContent::Absent);
        assert_eq!(
            decode_push(Some(b"Tu mesa esta lista")),
            PushContent::Text("Tu mesa esta lista".to_string())
        );
        assert_eq!(decode_push(Some(b"[1,2]")), PushContent::Text("[1,2]".to_string()));
        assert_eq!(decode_push(Some(br#""hola""#)), PushContent::Text("hola".to_string()));
    }

    #[test]
    fn test_invalid_utf8_is_text() {
        let content = decode_push(Some(&[0xff, 0xfe, b'h', b'i']));
        assert!(matches!(content, PushContent::Text(ref t) if t.ends_with("hi")));
    }

    #[test]
    fn test_broadcast_value_is_the_object_as_sent() {
        let sent = json!({"type": "promo", "mesa": 5, "minutos": "3", "title": 7, "posicion": 2});
        let content = decode_push(Some(sent.to_string().as_bytes()));
        assert_eq!(content.kind(), NotificationKind::Other);
        assert_eq!(content.to_value(), sent);

        let text = decode_push(Some(b"Hola")).to_value();
        assert_eq!(text, json!({"type": "other", "body": "Hola"}));
    }
}
