//! Now-playing presence on top of the gateway client.

mod activity;
mod publisher;


pub use activity::{build_activity, presence_payload};
pub use publisher::{PresencePublisher, PublishOutcome};
