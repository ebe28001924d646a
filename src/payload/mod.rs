// Payload Module - Inbound push payloads
//
// Typed view of the push message bytes, with fallbacks for anything
// that is not a well-formed JSON object

pub mod decode;

// Re-export public API
pub use decode::{
    decode_push,
    NotificationKind,
    NotificationPayload,
    PushContent,
    DEFAULT_MINUTES,
};
