// Host Module - Boundary to the notification host
//
// The HostAdapter trait is the only place side effects happen. settle()
// runs a Dispatch against an adapter and waits for every pending op.

pub mod executor;
pub mod recording;
#[cfg(feature = "tauri-host")]
pub mod desktop;

use crate::error::HostResult;
use crate::event::ClientMessage;
use crate::types::{ClientWindow, PresentationOptions, SubscriptionDescriptor};
use async_trait::async_trait;

// Re-export public API
pub use executor::{settle, Settled};
pub use recording::{HostCall, RecordingHost};
#[cfg(feature = "tauri-host")]
pub use desktop::TauriHost;

/// Notification tray, page enumeration and subscription manager of a host
#[async_trait]
pub trait HostAdapter: Send + Sync {
    /// Activate this version without waiting for the previous one to drain
    async fn skip_waiting(&self) -> HostResult<()>;

    /// Take control of every open page
    async fn claim_clients(&self) -> HostResult<()>;

    async fn show_notification(&self, options: &PresentationOptions) -> HostResult<()>;

    async fn close_notification(&self, tag: Option<&str>) -> HostResult<()>;

    /// Open pages, in host enumeration order
    async fn match_all_clients(&self) -> HostResult<Vec<ClientWindow>>;

    async fn focus_client(&self, client: &ClientWindow) -> HostResult<()>;

    async fn open_window(&self, url: &str) -> HostResult<()>;

    async fn post_message(&self, client: &ClientWindow, message: &ClientMessage) -> HostResult<()>;

    /// Current push subscription, `None` when not subscribed
    async fn subscription(&self) -> HostResult<Option<SubscriptionDescriptor>>;
}
