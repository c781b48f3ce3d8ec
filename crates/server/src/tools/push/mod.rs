//! Push delivery and subscription tools.

pub mod deliver;
pub mod reminders;
pub mod subscriptions;

pub use deliver::{PushDeliverParams, deliver_impl};
pub use reminders::{PushRemindersParams, reminders_impl};
pub use subscriptions::{PushSubscribeParams, PushUnsubscribeParams, list_impl, subscribe_impl, unsubscribe_impl};
