// Event Module - Page messaging protocol
//
// Requests pages post to the dispatcher, the replies they get back, and the
// broadcast every open page receives after a push

pub mod messages;

// Re-export public API
pub use messages::{
    ClientMessage,
    PageMessage,
    PageReply,
    ShowReply,
    ShowRequest,
    SubscriptionReply,
};
