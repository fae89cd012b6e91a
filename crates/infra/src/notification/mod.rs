//! Notification scheduling boundary.
//!
//! The pantry decides *whether* and *when* an expiration warning fires; actually
//! delivering it belongs to the platform behind [`NotificationDispatcher`].

pub mod dispatcher;
pub mod in_memory;

pub use dispatcher::{
    AuthorizationFlag, DispatchError, EXPIRATION_IDENTIFIER_PREFIX, NotificationAuthorization,
    NotificationDispatcher, NotificationRequest,
};
pub use in_memory::RecordingDispatcher;
