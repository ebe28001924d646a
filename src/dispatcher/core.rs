// Notification Dispatcher
//
// Maps each incoming event to the host work it requires. Handlers never
// touch the host themselves; they return a Dispatch whose pending ops a host
// adapter runs (see host::settle), keeping the event alive until all settle.
//

use crate::config::{self, DispatcherConfig};
use crate::event::{PageMessage, PageReply, ShowReply, ShowRequest};
use crate::payload::decode_push;
use crate::policy::{build_push_options, build_requested_options};
use crate::types::{current_timestamp_millis, PresentationOptions, ACTION_DISMISS};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A piece of host work an event is waiting on
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOp {
    /// Take over from any previous version immediately
    SkipWaiting,
    /// Start controlling every open page
    ClaimClients,
    ShowNotification {
        options: PresentationOptions,
        follow_up: FollowUp,
    },
    CloseNotification {
        tag: Option<String>,
    },
    FocusOrOpenClient {
        url: String,
    },
    /// Query the subscription manager and reply to the requesting page
    ReportSubscription,
    /// Reply known without any host call
    Reply(PageReply),
}

/// What happens once a ShowNotification settles
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUp {
    /// Broadcast PUSH_RECEIVED with the render outcome to every open page
    Broadcast { data: Value, timestamp: u64 },
    /// Reply {success, error?} to the requesting page
    ReplyToPage,
}

/// Host work produced by one event
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dispatch {
    pub pending: Vec<PendingOp>,
}

impl Dispatch {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(pending: Vec<PendingOp>) -> Self {
        Self { pending }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Notifications this dispatch will ask the host to render
    pub fn notifications(&self) -> impl Iterator<Item = &PresentationOptions> {
        self.pending.iter().filter_map(|op| match op {
            PendingOp::ShowNotification { options, .. } => Some(options),
            _ => None,
        })
    }
}

/// A click on a shown notification
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct NotificationClick {
    /// Action button id, `None` for a click on the body
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    /// The `data` bag attached when the notification was built
    #[serde(default)]
    pub data: Value,
}

impl NotificationClick {
    /// Click on a notification built from `options`
    pub fn on(options: &PresentationOptions, action: Option<&str>) -> Self {
        Self {
            action: action.map(str::to_string),
            tag: Some(options.tag.clone()),
            data: Value::Object(options.data.clone()),
        }
    }
}

/// Stateless event handler over a fixed configuration
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: Arc<DispatcherConfig>,
    clock: fn() -> u64,
}

impl Dispatcher {
    pub fn new(config: Arc<DispatcherConfig>) -> Self {
        Self {
            config,
            clock: current_timestamp_millis,
        }
    }

    /// Dispatcher over the process-wide configuration
    pub fn from_global() -> Self {
        Self::new(config::current())
    }

    /// Replace the millisecond clock used for timestamps
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn on_install(&self) -> Dispatch {
        info!("[Dispatcher] Installing version {}, skipping wait", self.config.version);
        Dispatch::of(vec![PendingOp::SkipWaiting])
    }

    pub fn on_activate(&self) -> Dispatch {
        info!("[Dispatcher] Activating version {}, claiming clients", self.config.version);
        Dispatch::of(vec![PendingOp::ClaimClients])
    }

    /// Always yields exactly one notification, whatever the payload
    pub fn on_push(&self, raw: Option<&[u8]>) -> Dispatch {
        let now = (self.clock)();
        let content = decode_push(raw);
        let options = build_push_options(&self.config, &content, now);

        info!(
            "[Dispatcher] 📢 Push of type {} -> tag={} requireInteraction={}",
            content.kind(),
            options.tag,
            options.require_interaction
        );

        Dispatch::of(vec![PendingOp::ShowNotification {
            options,
            follow_up: FollowUp::Broadcast {
                data: content.to_value(),
                timestamp: now,
            },
        }])
    }

    pub fn on_notification_click(&self, click: &NotificationClick) -> Dispatch {
        let mut pending = vec![PendingOp::CloseNotification {
            tag: click.tag.clone(),
        }];

        if click.action.as_deref() == Some(ACTION_DISMISS) {
            debug!("[Dispatcher] Notification dismissed");
            return Dispatch::of(pending);
        }

        let url = click
            .data
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&self.config.target_path)
            .to_string();

        info!(
            "[Dispatcher] Notification clicked (action={:?}), target {}",
            click.action, url
        );
        pending.push(PendingOp::FocusOrOpenClient { url });
        Dispatch::of(pending)
    }

    /// Unknown or undecodable messages are ignored
    pub fn on_message(&self, raw: &[u8]) -> Dispatch {
        match PageMessage::decode(raw) {
            Some(PageMessage::ShowNotification { data }) => self.on_show_request(&data),
            Some(PageMessage::GetSubscription {}) => {
                debug!("[Dispatcher] Page asked for the push subscription");
                Dispatch::of(vec![PendingOp::ReportSubscription])
            }
            None => Dispatch::none(),
        }
    }

    fn on_show_request(&self, data: &Value) -> Dispatch {
        match ShowRequest::from_data(data) {
            Ok(request) => {
                let options = build_requested_options(&self.config, &request, (self.clock)());
                info!("[Dispatcher] Page requested notification {:?}", options.title);
                Dispatch::of(vec![PendingOp::ShowNotification {
                    options,
                    follow_up: FollowUp::ReplyToPage,
                }])
            }
            Err(e) => {
                warn!("[Dispatcher] ⚠️ Rejected SHOW_NOTIFICATION: {}", e);
                Dispatch::of(vec![PendingOp::Reply(PageReply::Show(ShowReply::failed(e)))])
            }
        }
    }
}
