//! Domain types for the Luxe storefront.
//!
//! The backend owns every entity; these types mirror its JSON payloads and
//! tolerate missing or `null` fields the way the pages need them to.

pub mod cart;
pub mod catalog;
pub mod comment;
pub mod id;
pub mod notification;
pub mod phone;
pub mod price;
pub mod status;
pub mod user;

pub use cart::{CartItem, NewCartItem};
pub use catalog::{Collection, CollectionRef, Product, RatingSummary, Section};
pub use comment::{Comment, CommentAuthor, CommentProduct, Reply};
pub use id::*;
pub use notification::{Notification, NotificationKind};
pub use phone::{Phone, PhoneError};
pub use price::Price;
pub use status::*;
pub use user::{Address, Ban, Location, ProfilePayload, User, UserRecord};

/// Deserialize a field that may be missing or `null` into its default value.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a field that may hold an unexpected shape into `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    use serde::Deserialize;
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

pub(crate) const fn default_true() -> bool {
    true
}
