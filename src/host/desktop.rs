// Tauri Host
//
// Desktop host on Tauri 1.x. Webview windows play the role of open pages:
// - notifications go through the native notification API
// - PUSH_RECEIVED is emitted to each window
// - clicks focus an existing window or build a new one
// Tag replacement, vibration and action buttons are not available on the
// native tray and are dropped. Push subscriptions do not exist here.
//

use super::HostAdapter;
use crate::config::DispatcherConfig;
use crate::error::{HostError, HostResult};
use crate::event::ClientMessage;
use crate::types::{ClientWindow, PresentationOptions, SubscriptionDescriptor};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tauri::api::notification::Notification;
use tauri::{AppHandle, Manager, WindowBuilder, WindowUrl};
use tracing::{debug, info, warn};

pub struct TauriHost {
    app: AppHandle,
    config: Arc<DispatcherConfig>,
    opened: AtomicUsize,
}

impl TauriHost {
    pub fn new(app: AppHandle, config: Arc<DispatcherConfig>) -> Self {
        info!("[TauriHost] ✅ Desktop notification host initialized");
        Self {
            app,
            config,
            opened: AtomicUsize::new(0),
        }
    }

    /// Bundle identifier of the running app, configured one as fallback
    fn bundle_id(&self) -> String {
        let identifier = &self.app.config().tauri.bundle.identifier;
        if identifier.is_empty() {
            warn!("[TauriHost] ⚠️ App has no bundle identifier, using configured one");
            self.config.bundle_identifier.clone()
        } else {
            identifier.clone()
        }
    }
}

fn platform(e: impl std::fmt::Display) -> HostError {
    HostError::Platform(e.to_string())
}

#[async_trait]
impl HostAdapter for TauriHost {
    async fn skip_waiting(&self) -> HostResult<()> {
        debug!("[TauriHost] Single app instance, nothing to skip");
        Ok(())
    }

    async fn claim_clients(&self) -> HostResult<()> {
        debug!("[TauriHost] All windows belong to this process already");
        Ok(())
    }

    async fn show_notification(&self, options: &PresentationOptions) -> HostResult<()> {
        debug!(
            "[TauriHost] Showing {:?} (tag={}, {} vibration steps dropped)",
            options.title,
            options.tag,
            options.vibrate.len()
        );

        Notification::new(self.bundle_id())
            .title(&options.title)
            .body(&options.body)
            .icon(&options.icon)
            .show()
            .map_err(platform)
    }

    async fn close_notification(&self, tag: Option<&str>) -> HostResult<()> {
        // the native tray closes clicked notifications itself
        debug!("[TauriHost] Close requested for tag {:?}", tag);
        Ok(())
    }

    async fn match_all_clients(&self) -> HostResult<Vec<ClientWindow>> {
        let clients = self
            .app
            .windows()
            .into_iter()
            .map(|(label, window)| ClientWindow {
                id: label,
                url: window.url().to_string(),
                focused: false,
            })
            .collect();
        Ok(clients)
    }

    async fn focus_client(&self, client: &ClientWindow) -> HostResult<()> {
        let window = self
            .app
            .get_window(&client.id)
            .ok_or_else(|| HostError::UnknownClient(client.id.clone()))?;

        window.unminimize().map_err(platform)?;
        window.show().map_err(platform)?;
        window.set_focus().map_err(platform)
    }

    async fn open_window(&self, url: &str) -> HostResult<()> {
        let label = format!("cliente-{}", self.opened.fetch_add(1, Ordering::SeqCst) + 1);
        let path = PathBuf::from(url.trim_start_matches('/'));

        WindowBuilder::new(&self.app, label.clone(), WindowUrl::App(path))
            .title(&self.config.app_name)
            .build()
            .map_err(platform)?;

        info!("[TauriHost] Opened window {} at {}", label, url);
        Ok(())
    }

    async fn post_message(&self, client: &ClientWindow, message: &ClientMessage) -> HostResult<()> {
        let window = self
            .app
            .get_window(&client.id)
            .ok_or_else(|| HostError::UnknownClient(client.id.clone()))?;

        window
            .emit(message.event_name(), message.clone())
            .map_err(platform)
    }

    async fn subscription(&self) -> HostResult<Option<SubscriptionDescriptor>> {
        Err(HostError::Unsupported("push subscription"))
    }
}
