//! Endpoint groups, one `impl Api<'_>` block per backend resource.

pub mod addresses;
pub mod auth;
pub mod collections;
pub mod comments;
pub mod contact;
pub mod notifications;
pub mod products;
pub mod users;
