// Alleria Notify
//
// Push notification dispatcher for the restaurant waiting queue. Decides how
// each push, notification click and page message is presented, and leaves
// every side effect to a HostAdapter.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod host;
pub mod payload;
pub mod policy;
pub mod types;

pub use config::DispatcherConfig;
pub use dispatcher::{Dispatch, Dispatcher, NotificationClick, PendingOp};
pub use error::{ConfigError, HostError, RequestError};
pub use host::{settle, HostAdapter, RecordingHost, Settled};
pub use types::PresentationOptions;
