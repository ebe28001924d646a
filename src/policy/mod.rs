// Policy Module - Notification presentation policy
//
// Per-type policy table plus the builder that turns decoded content into
// PresentationOptions

pub mod builder;
pub mod table;

// Re-export public API
pub use builder::{build_push_options, build_requested_options};
pub use table::{policy_for, KindPolicy, Urgency};
