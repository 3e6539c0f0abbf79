//! The dashboard summary of a user's finances.

mod handlers;
mod summary;

pub use handlers::get_dashboard_endpoint;
