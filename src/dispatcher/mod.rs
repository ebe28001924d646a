// Dispatcher Module - Notification event handling
//
// One pure handler per event kind (install, activate, push, click, page
// message). Each returns the host work the event must wait for.

pub mod click;
pub mod core;

// Re-export public API
pub use self::click::{choose_client, url_path, ClientChoice};
pub use self::core::{Dispatch, Dispatcher, FollowUp, NotificationClick, PendingOp};
