// Options Builder
//
// Builds exactly one PresentationOptions per push (or page request) from
// the decoded content, the policy table and the fixed configuration.
//

use super::table::{policy_for, KindPolicy};
use crate::config::DispatcherConfig;
use crate::event::ShowRequest;
use crate::payload::{NotificationKind, NotificationPayload, PushContent};
use crate::types::{NotificationAction, PresentationOptions, ACTION_DISMISS, ACTION_VIEW};
use serde_json::{Map, Value};
use tracing::warn;

/// Build the options for a push event
pub fn build_push_options(
    config: &DispatcherConfig,
    content: &PushContent,
    now_millis: u64,
) -> PresentationOptions {
    let policy = policy_for(content.kind());

    let (title, body, data) = match content {
        PushContent::Structured(payload) => {
            let (title, body) = structured_text(config, payload);
            (title, body, payload_data(config, payload, now_millis))
        }
        PushContent::Text(text) => (
            config.app_name.clone(),
            text.clone(),
            base_data(config, NotificationKind::Other, None, now_millis),
        ),
        PushContent::Absent => (
            config.app_name.clone(),
            config.generic_message.clone(),
            base_data(config, NotificationKind::Other, None, now_millis),
        ),
    };

    assemble(config, &policy, title, body, data)
}

/// Build the options for a SHOW_NOTIFICATION page request
pub fn build_requested_options(
    config: &DispatcherConfig,
    request: &ShowRequest,
    now_millis: u64,
) -> PresentationOptions {
    let policy = policy_for(NotificationKind::Other);
    let body = request
        .body
        .clone()
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| config.generic_message.clone());

    let mut data = base_data(config, NotificationKind::Other, None, now_millis);
    if let Some(mesa) = &request.mesa {
        data.insert("mesa".to_string(), Value::String(mesa.clone()));
    }

    let mut options = assemble(config, &policy, request.title.clone(), body, data);
    if let Some(vibrate) = &request.vibrate {
        options.vibrate = vibrate.clone();
    }
    if let Some(tag) = &request.tag {
        options.tag = tag.clone();
    }
    if let Some(require_interaction) = request.require_interaction {
        options.require_interaction = require_interaction;
    }
    options
}

/// Title and body for a structured payload
fn structured_text(config: &DispatcherConfig, payload: &NotificationPayload) -> (String, String) {
    match payload.kind {
        NotificationKind::TurnoListo => {
            let body = match &payload.mesa {
                Some(mesa) => format!("Tu mesa {} está lista. Acércate a recepción.", mesa),
                None => "Tu mesa está lista. Acércate a recepción.".to_string(),
            };
            ("🍽️ ¡Es tu turno!".to_string(), body)
        }
        NotificationKind::Preaviso => {
            let minutes = payload.minutes();
            let body = if minutes == 1 {
                "Falta aproximadamente 1 minuto para tu turno.".to_string()
            } else {
                format!("Faltan aproximadamente {} minutos para tu turno.", minutes)
            };
            ("⏰ Tu turno se acerca".to_string(), body)
        }
        NotificationKind::LlamadaMesa => {
            let body = match &payload.mesa {
                Some(mesa) => format!("Por favor, acércate a la mesa {}.", mesa),
                None => "Por favor, acércate a recepción.".to_string(),
            };
            ("📢 Te están llamando".to_string(), body)
        }
        NotificationKind::Other => (
            payload.title.clone().unwrap_or_else(|| config.app_name.clone()),
            payload
                .body
                .clone()
                .unwrap_or_else(|| config.generic_message.clone()),
        ),
    }
}

/// Click-time data bag for a structured payload: passthrough fields first,
/// then the recognized ones
fn payload_data(
    config: &DispatcherConfig,
    payload: &NotificationPayload,
    now_millis: u64,
) -> Map<String, Value> {
    let mut data = payload.extra.clone();
    data.extend(base_data(config, payload.kind, payload.url.as_deref(), now_millis));

    if let Some(mesa) = &payload.mesa {
        data.insert("mesa".to_string(), Value::String(mesa.clone()));
    }
    if payload.kind == NotificationKind::Preaviso || payload.minutos.is_some() {
        data.insert("minutos".to_string(), Value::from(payload.minutes()));
    }
    data
}

fn base_data(
    config: &DispatcherConfig,
    kind: NotificationKind,
    url: Option<&str>,
    now_millis: u64,
) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert("url".to_string(), Value::String(click_target(config, url)));
    data.insert("type".to_string(), Value::String(kind.as_str().to_string()));
    data.insert("dateOfArrival".to_string(), Value::from(now_millis));
    data
}

/// Payload-supplied click target, accepted only as an absolute path
fn click_target(config: &DispatcherConfig, url: Option<&str>) -> String {
    match url.map(str::trim) {
        Some(url) if url.starts_with('/') && !url.starts_with("//") => url.to_string(),
        Some(url) => {
            warn!("[OptionsBuilder] Ignoring non-local click target {:?}", url);
            config.target_path.clone()
        }
        None => config.target_path.clone(),
    }
}

fn assemble(
    config: &DispatcherConfig,
    policy: &KindPolicy,
    title: String,
    body: String,
    data: Map<String, Value>,
) -> PresentationOptions {
    PresentationOptions {
        title,
        body,
        icon: config.icon.clone(),
        badge: config.badge.clone(),
        tag: policy.tag.to_string(),
        vibrate: policy.urgency.vibration_pattern(),
        require_interaction: policy.require_interaction,
        actions: actions(config),
        data,
    }
}

/// Fixed action set: view, then dismiss
fn actions(config: &DispatcherConfig) -> Vec<NotificationAction> {
    vec![
        NotificationAction {
            action: ACTION_VIEW.to_string(),
            title: config.view_action_title.clone(),
            icon: Some(config.view_action_icon.clone()),
        },
        NotificationAction {
            action: ACTION_DISMISS.to_string(),
            title: config.dismiss_action_title.clone(),
            icon: None,
        },
    ]
}
