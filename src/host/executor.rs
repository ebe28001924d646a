// Host Executor
//
// Runs every pending op of a Dispatch against a HostAdapter and only
// returns once all of them have settled. Host failures are logged and
// counted, never propagated: a push has nobody to report to, and a page
// request gets its failure back as a reply.
//

use super::HostAdapter;
use crate::dispatcher::{choose_client, ClientChoice, Dispatch, FollowUp, PendingOp};
use crate::error::HostResult;
use crate::event::{ClientMessage, PageReply, ShowReply, SubscriptionReply};
use crate::types::PresentationOptions;
use futures::future::join_all;
use tracing::{debug, info, warn};

/// Outcome of a settled Dispatch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settled {
    /// Reply for the requesting page, if the event came from one
    pub reply: Option<PageReply>,
    /// Host calls that failed
    pub failures: usize,
}

#[derive(Default)]
struct OpOutcome {
    reply: Option<PageReply>,
    failures: usize,
}

impl OpOutcome {
    fn from_result(result: HostResult<()>, what: &str) -> Self {
        match result {
            Ok(()) => {
                debug!("[HostExecutor] {} done", what);
                Self::default()
            }
            Err(e) => {
                warn!("[HostExecutor] ⚠️ {} failed: {}", what, e);
                Self { reply: None, failures: 1 }
            }
        }
    }
}

/// Run all pending ops concurrently and wait for them to settle
pub async fn settle<H>(host: &H, dispatch: Dispatch) -> Settled
where
    H: HostAdapter + ?Sized,
{
    let outcomes = join_all(dispatch.pending.into_iter().map(|op| run_op(host, op))).await;

    let mut settled = Settled::default();
    for outcome in outcomes {
        settled.failures += outcome.failures;
        if outcome.reply.is_some() {
            settled.reply = outcome.reply;
        }
    }
    settled
}

async fn run_op<H>(host: &H, op: PendingOp) -> OpOutcome
where
    H: HostAdapter + ?Sized,
{
    match op {
        PendingOp::SkipWaiting => OpOutcome::from_result(host.skip_waiting().await, "Skip waiting"),
        PendingOp::ClaimClients => OpOutcome::from_result(host.claim_clients().await, "Claim clients"),
        PendingOp::ShowNotification { options, follow_up } => show(host, &options, follow_up).await,
        PendingOp::CloseNotification { tag } => OpOutcome::from_result(
            host.close_notification(tag.as_deref()).await,
            "Close notification",
        ),
        PendingOp::FocusOrOpenClient { url } => focus_or_open(host, &url).await,
        PendingOp::ReportSubscription => report_subscription(host).await,
        PendingOp::Reply(reply) => OpOutcome {
            reply: Some(reply),
            failures: 0,
        },
    }
}

async fn show<H>(host: &H, options: &PresentationOptions, follow_up: FollowUp) -> OpOutcome
where
    H: HostAdapter + ?Sized,
{
    let result = host.show_notification(options).await;
    let mut outcome = OpOutcome::default();

    let error = match result {
        Ok(()) => {
            info!("[HostExecutor] ✅ Notification shown (tag={})", options.tag);
            None
        }
        Err(e) => {
            warn!("[HostExecutor] ⚠️ Failed to show notification (tag={}): {}", options.tag, e);
            outcome.failures += 1;
            Some(e)
        }
    };

    match follow_up {
        FollowUp::Broadcast { data, timestamp } => {
            let message = ClientMessage::PushReceived {
                data,
                timestamp,
                success: error.is_none(),
            };
            outcome.failures += broadcast(host, &message).await;
        }
        FollowUp::ReplyToPage => {
            let reply = match error {
                None => ShowReply::ok(),
                Some(e) => ShowReply::failed(e),
            };
            outcome.reply = Some(PageReply::Show(reply));
        }
    }
    outcome
}

/// Post to every open page; returns the number of failed host calls
async fn broadcast<H>(host: &H, message: &ClientMessage) -> usize
where
    H: HostAdapter + ?Sized,
{
    let clients = match host.match_all_clients().await {
        Ok(clients) => clients,
        Err(e) => {
            warn!("[HostExecutor] ⚠️ Cannot broadcast {}: {}", message.event_name(), e);
            return 1;
        }
    };

    let results = join_all(clients.iter().map(|client| host.post_message(client, message))).await;

    let mut failures = 0;
    for (client, result) in clients.iter().zip(results) {
        if let Err(e) = result {
            warn!("[HostExecutor] Failed to post {} to {}: {}", message.event_name(), client.id, e);
            failures += 1;
        }
    }
    debug!(
        "[HostExecutor] 📡 Broadcast {} to {} page(s), {} failed",
        message.event_name(),
        clients.len(),
        failures
    );
    failures
}

async fn focus_or_open<H>(host: &H, url: &str) -> OpOutcome
where
    H: HostAdapter + ?Sized,
{
    let mut outcome = OpOutcome::default();

    let clients = match host.match_all_clients().await {
        Ok(clients) => clients,
        Err(e) => {
            warn!("[HostExecutor] ⚠️ Cannot enumerate pages, opening a new one: {}", e);
            outcome.failures += 1;
            Vec::new()
        }
    };

    let target = match choose_client(&clients, url) {
        ClientChoice::Focus(client) => match host.focus_client(&client).await {
            Ok(()) => {
                info!("[HostExecutor] Focused page {} ({})", client.id, client.url);
                return outcome;
            }
            Err(e) => {
                warn!("[HostExecutor] ⚠️ Failed to focus page {}, opening a new one: {}", client.id, e);
                outcome.failures += 1;
                url.to_string()
            }
        },
        ClientChoice::Open(url) => url,
    };

    match host.open_window(&target).await {
        Ok(()) => info!("[HostExecutor] Opened new page at {}", target),
        Err(e) => {
            warn!("[HostExecutor] ⚠️ Failed to open {}: {}", target, e);
            outcome.failures += 1;
        }
    }
    outcome
}

async fn report_subscription<H>(host: &H) -> OpOutcome
where
    H: HostAdapter + ?Sized,
{
    let (reply, failures) = match host.subscription().await {
        Ok(subscription) => {
            debug!("[HostExecutor] Subscription present: {}", subscription.is_some());
            (SubscriptionReply::Info { subscription }, 0)
        }
        Err(e) => {
            warn!("[HostExecutor] ⚠️ Failed to read subscription: {}", e);
            (SubscriptionReply::Error { error: e.to_string() }, 1)
        }
    };

    OpOutcome {
        reply: Some(PageReply::Subscription(reply)),
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatcherConfig;
    use crate::dispatcher::{Dispatcher, NotificationClick};
    use crate::error::HostError;
    use crate::host::{HostCall, RecordingHost};
    use crate::types::{ClientWindow, SubscriptionDescriptor, SubscriptionKeys, ACTION_DISMISS};
    use serde_json::json;
    use std::sync::Arc;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(DispatcherConfig::default())).with_clock(|| 1_000)
    }

    fn enumerations(host: &RecordingHost) -> usize {
        host.calls()
            .iter()
            .filter(|call| matches!(call, HostCall::MatchAllClients))
            .count()
    }

    fn click_on_push(dispatcher: &Dispatcher, action: Option<&str>) -> NotificationClick {
        let push = dispatcher.on_push(Some(br#"{"type":"turno_listo","mesa":1}"#));
        let options = push.notifications().next().cloned().unwrap();
        NotificationClick::on(&options, action)
    }

    #[tokio::test]
    async fn test_absent_push_shows_exactly_one_notification() {
        let host = RecordingHost::new();
        let settled = settle(&host, dispatcher().on_push(None)).await;

        let shown = host.shown();
        assert_eq!(shown.len(), 1);
        assert!(!shown[0].title.is_empty());
        assert!(!shown[0].body.is_empty());
        assert_eq!(settled.failures, 0);
        assert_eq!(settled.reply, None);
    }

    #[tokio::test]
    async fn test_text_push_uses_fallback_without_failure() {
        let host = RecordingHost::new();
        let settled = settle(&host, dispatcher().on_push(Some(b"Pasa a recepcion"))).await;

        assert_eq!(host.shown()[0].body, "Pasa a recepcion");
        assert_eq!(settled.failures, 0);
    }

    #[tokio::test]
    async fn test_push_broadcasts_receipt_to_every_page() {
        let host = RecordingHost::new().with_clients(vec![
            ClientWindow::new("a", "https://alleria.example/cliente"),
            ClientWindow::new("b", "https://alleria.example/trabajador"),
        ]);
        settle(&host, dispatcher().on_push(Some(br#"{"type":"llamada_mesa","mesa":5}"#))).await;

        let posted = host.posted();
        assert_eq!(posted.len(), 2);
        let value = serde_json::to_value(&posted[0].1).unwrap();
        assert_eq!(value["type"], json!("PUSH_RECEIVED"));
        assert_eq!(value["data"]["type"], json!("llamada_mesa"));
        assert_eq!(value["data"]["mesa"], json!(5));
        assert_eq!(value["timestamp"], json!(1_000));
        assert_eq!(value["success"], json!(true));
    }

    #[tokio::test]
    async fn test_receipt_carries_payload_unchanged() {
        let host = RecordingHost::new().with_clients(vec![ClientWindow::new("a", "https://alleria.example/cliente")]);
        let sent = json!({"type": "promo", "mesa": 5, "minutos": "3", "title": 7, "posicion": 2});
        settle(&host, dispatcher().on_push(Some(sent.to_string().as_bytes()))).await;

        let value = serde_json::to_value(&host.posted()[0].1).unwrap();
        assert_eq!(value["data"], sent);
        assert_eq!(host.shown()[0].tag, "restaurant-notification");
    }

    #[tokio::test]
    async fn test_render_failure_is_contained() {
        let host = RecordingHost::new()
            .with_clients(vec![ClientWindow::new("a", "https://alleria.example/cliente")])
            .failing_show(HostError::PermissionDenied("notifications blocked".to_string()));

        let settled = settle(&host, dispatcher().on_push(Some(br#"{"type":"preaviso"}"#))).await;

        assert_eq!(settled.failures, 1);
        let value = serde_json::to_value(&host.posted()[0].1).unwrap();
        assert_eq!(value["success"], json!(false));
    }

    #[tokio::test]
    async fn test_dismiss_never_touches_pages() {
        let dispatcher = dispatcher();
        let host = RecordingHost::new()
            .with_clients(vec![ClientWindow::new("a", "https://alleria.example/cliente")]);

        settle(&host, dispatcher.on_notification_click(&click_on_push(&dispatcher, Some(ACTION_DISMISS)))).await;

        assert_eq!(
            host.calls(),
            vec![HostCall::CloseNotification {
                tag: Some("turno-mesa".to_string())
            }]
        );
        assert_eq!(enumerations(&host), 0);
    }

    #[tokio::test]
    async fn test_click_focuses_open_page() {
        let dispatcher = dispatcher();
        for action in [None, Some("view")] {
            let host = RecordingHost::new().with_clients(vec![
                ClientWindow::new("worker", "https://alleria.example/trabajador"),
                ClientWindow::new("customer", "https://alleria.example/cliente"),
            ]);

            settle(&host, dispatcher.on_notification_click(&click_on_push(&dispatcher, action))).await;

            let calls = host.calls();
            assert!(calls.contains(&HostCall::FocusClient {
                id: "customer".to_string()
            }));
            assert!(!calls.iter().any(|call| matches!(call, HostCall::OpenWindow { .. })));
        }
    }

    #[tokio::test]
    async fn test_click_opens_exactly_one_page_when_none_match() {
        let dispatcher = dispatcher();
        let host = RecordingHost::new()
            .with_clients(vec![ClientWindow::new("worker", "https://alleria.example/trabajador")]);

        settle(&host, dispatcher.on_notification_click(&click_on_push(&dispatcher, None))).await;

        let opened: Vec<_> = host
            .calls()
            .into_iter()
            .filter(|call| matches!(call, HostCall::OpenWindow { .. }))
            .collect();
        assert_eq!(
            opened,
            vec![HostCall::OpenWindow {
                url: "/cliente".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_enumeration_failure_still_opens_page() {
        let dispatcher = dispatcher();
        let host = RecordingHost::new().failing_clients(HostError::Platform("gone".to_string()));

        let settled = settle(&host, dispatcher.on_notification_click(&click_on_push(&dispatcher, None))).await;

        assert_eq!(settled.failures, 1);
        assert!(host.calls().contains(&HostCall::OpenWindow {
            url: "/cliente".to_string()
        }));
    }

    #[tokio::test]
    async fn test_malformed_show_message_gets_failure_reply() {
        let host = RecordingHost::new();
        let dispatch = dispatcher().on_message(br#"{"type":"SHOW_NOTIFICATION","data":{"body":"x"}}"#);
        let settled = settle(&host, dispatch).await;

        match settled.reply {
            Some(PageReply::Show(reply)) => {
                assert!(!reply.success);
                assert!(reply.error.is_some());
            }
            other => panic!("unexpected reply {:?}", other),
        }
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn test_show_message_reports_host_failure() {
        let host = RecordingHost::new().failing_show(HostError::PermissionDenied("revoked".to_string()));
        let dispatch = dispatcher().on_message(br#"{"type":"SHOW_NOTIFICATION","data":{"title":"Hola"}}"#);
        let settled = settle(&host, dispatch).await;

        assert_eq!(
            settled.reply,
            Some(PageReply::Show(ShowReply::failed("permission denied: revoked")))
        );
        // page requests are answered directly, no broadcast
        assert!(host.posted().is_empty());
    }

    #[tokio::test]
    async fn test_show_message_success_reply() {
        let host = RecordingHost::new();
        let dispatch = dispatcher().on_message(br#"{"type":"SHOW_NOTIFICATION","data":{"title":"Hola","tag":"t1"}}"#);
        let settled = settle(&host, dispatch).await;

        assert_eq!(settled.reply, Some(PageReply::Show(ShowReply::ok())));
        assert_eq!(host.shown()[0].tag, "t1");
    }

    #[tokio::test]
    async fn test_subscription_replies() {
        let descriptor = SubscriptionDescriptor {
            endpoint: "https://push.example/42".to_string(),
            expiration_time: None,
            keys: SubscriptionKeys {
                p256dh: "k".to_string(),
                auth: "a".to_string(),
            },
        };
        let host = RecordingHost::new().with_subscription(descriptor.clone());
        let settled = settle(&host, dispatcher().on_message(br#"{"type":"GET_SUBSCRIPTION"}"#)).await;
        assert_eq!(
            settled.reply,
            Some(PageReply::Subscription(SubscriptionReply::Info {
                subscription: Some(descriptor)
            }))
        );

        let unsubscribed = RecordingHost::new();
        let settled = settle(&unsubscribed, dispatcher().on_message(br#"{"type":"GET_SUBSCRIPTION"}"#)).await;
        assert_eq!(
            serde_json::to_value(settled.reply.unwrap()).unwrap(),
            json!({"type": "SUBSCRIPTION_INFO", "subscription": null})
        );

        let failing = RecordingHost::new().failing_subscription(HostError::Unsupported("push subscription"));
        let settled = settle(&failing, dispatcher().on_message(br#"{"type":"GET_SUBSCRIPTION"}"#)).await;
        assert!(matches!(
            settled.reply,
            Some(PageReply::Subscription(SubscriptionReply::Error { .. }))
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_and_ignored_message() {
        let dispatcher = dispatcher();
        let host = RecordingHost::new();

        settle(&host, dispatcher.on_install()).await;
        settle(&host, dispatcher.on_activate()).await;
        let settled = settle(&host, dispatcher.on_message(br#"{"type":"UNKNOWN"}"#)).await;

        assert_eq!(host.calls(), vec![HostCall::SkipWaiting, HostCall::ClaimClients]);
        assert_eq!(settled, Settled::default());
    }
}
