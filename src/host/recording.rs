// Recording Host
//
// In-memory host that records every call it receives. Open pages,
// subscription state and failures are configurable, which makes it the
// harness for dispatcher tests and the backend of the console simulator.
//

use super::HostAdapter;
use crate::error::{HostError, HostResult};
use crate::event::ClientMessage;
use crate::types::{ClientWindow, PresentationOptions, SubscriptionDescriptor};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One call received by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    SkipWaiting,
    ClaimClients,
    ShowNotification { options: PresentationOptions },
    CloseNotification { tag: Option<String> },
    MatchAllClients,
    FocusClient { id: String },
    OpenWindow { url: String },
    PostMessage { client: String, message: ClientMessage },
    Subscription,
}

#[derive(Debug)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    clients: Mutex<Vec<ClientWindow>>,
    subscription: HostResult<Option<SubscriptionDescriptor>>,
    show_error: Option<HostError>,
    clients_error: Option<HostError>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            clients: Mutex::new(Vec::new()),
            subscription: Ok(None),
            show_error: None,
            clients_error: None,
        }
    }

    /// Pages open before the first event
    pub fn with_clients(self, clients: Vec<ClientWindow>) -> Self {
        *lock(&self.clients) = clients;
        self
    }

    pub fn with_subscription(mut self, subscription: SubscriptionDescriptor) -> Self {
        self.subscription = Ok(Some(subscription));
        self
    }

    pub fn failing_subscription(mut self, error: HostError) -> Self {
        self.subscription = Err(error);
        self
    }

    /// Every render request fails with `error`
    pub fn failing_show(mut self, error: HostError) -> Self {
        self.show_error = Some(error);
        self
    }

    /// Page enumeration fails with `error`
    pub fn failing_clients(mut self, error: HostError) -> Self {
        self.clients_error = Some(error);
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<HostCall> {
        lock(&self.calls).clone()
    }

    /// Notifications the host was asked to render
    pub fn shown(&self) -> Vec<PresentationOptions> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::ShowNotification { options } => Some(options),
                _ => None,
            })
            .collect()
    }

    /// Messages posted to pages, as (page id, message)
    pub fn posted(&self) -> Vec<(String, ClientMessage)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::PostMessage { client, message } => Some((client, message)),
                _ => None,
            })
            .collect()
    }

    /// Pages currently open, including ones opened by clicks
    pub fn clients(&self) -> Vec<ClientWindow> {
        lock(&self.clients).clone()
    }

    fn record(&self, call: HostCall) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl HostAdapter for RecordingHost {
    async fn skip_waiting(&self) -> HostResult<()> {
        self.record(HostCall::SkipWaiting);
        Ok(())
    }

    async fn claim_clients(&self) -> HostResult<()> {
        self.record(HostCall::ClaimClients);
        Ok(())
    }

    async fn show_notification(&self, options: &PresentationOptions) -> HostResult<()> {
        self.record(HostCall::ShowNotification {
            options: options.clone(),
        });
        match &self.show_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn close_notification(&self, tag: Option<&str>) -> HostResult<()> {
        self.record(HostCall::CloseNotification {
            tag: tag.map(str::to_string),
        });
        Ok(())
    }

    async fn match_all_clients(&self) -> HostResult<Vec<ClientWindow>> {
        self.record(HostCall::MatchAllClients);
        match &self.clients_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.clients()),
        }
    }

    async fn focus_client(&self, client: &ClientWindow) -> HostResult<()> {
        self.record(HostCall::FocusClient {
            id: client.id.clone(),
        });

        let mut clients = lock(&self.clients);
        if !clients.iter().any(|open| open.id == client.id) {
            return Err(HostError::UnknownClient(client.id.clone()));
        }
        for open in clients.iter_mut() {
            open.focused = open.id == client.id;
        }
        Ok(())
    }

    async fn open_window(&self, url: &str) -> HostResult<()> {
        self.record(HostCall::OpenWindow {
            url: url.to_string(),
        });

        let mut clients = lock(&self.clients);
        for open in clients.iter_mut() {
            open.focused = false;
        }
        let id = format!("window-{}", clients.len() + 1);
        clients.push(ClientWindow {
            id,
            url: url.to_string(),
            focused: true,
        });
        Ok(())
    }

    async fn post_message(&self, client: &ClientWindow, message: &ClientMessage) -> HostResult<()> {
        self.record(HostCall::PostMessage {
            client: client.id.clone(),
            message: message.clone(),
        });
        Ok(())
    }

    async fn subscription(&self) -> HostResult<Option<SubscriptionDescriptor>> {
        self.record(HostCall::Subscription);
        self.subscription.clone()
    }
}
