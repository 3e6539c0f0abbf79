//! User notifications about budgets, recurring transactions and goals.

mod core;
mod endpoints;
mod generator;

pub use core::{
    NewNotification, Notification, NotificationType, create_notification_table,
    get_notifications, insert_notification,
};
pub use endpoints::{generate_notifications_endpoint, list_notifications_endpoint};
pub use generator::generate_and_store;
