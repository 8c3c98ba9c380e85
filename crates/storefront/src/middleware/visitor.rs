//! The visitor's cart store, backed by their session.
//!
//! [`SessionStorage`] snapshots the store's keys out of the session when a
//! request starts and writes back only the keys that changed. Handlers that
//! mutate the cart or the user must call [`Visitor::save`].

use std::collections::{HashMap, HashSet};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use luxe_core::store::{CartStore, KeyValueStorage, keys};
use luxe_core::User;
use luxe_core::validation::{ValidationError, check_submit_interval};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{Flash, session_keys};

/// Key/value storage over the session's store keys.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    values: HashMap<String, String>,
    dirty: HashSet<String>,
}

impl SessionStorage {
    /// Read every store key out of the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        let mut values = HashMap::new();
        for key in keys::ALL {
            if let Some(value) = session.get::<String>(key).await? {
                values.insert(key.to_owned(), value);
            }
        }
        Ok(Self {
            values,
            dirty: HashSet::new(),
        })
    }

    /// Write changed keys back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn flush(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        for key in &self.dirty {
            match self.values.get(key) {
                Some(value) => session.insert(key, value).await?,
                None => {
                    session.remove::<String>(key).await?;
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }
}

impl KeyValueStorage for SessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
        self.dirty.insert(key.to_owned());
    }

    fn remove_item(&mut self, key: &str) {
        self.values.remove(key);
        self.dirty.insert(key.to_owned());
    }
}

/// Everything a handler needs about the current visitor.
///
/// # Example
///
/// ```rust,ignore
/// async fn add(mut visitor: Visitor) -> Result<Redirect> {
///     visitor.store.clear_cart();
///     visitor.save().await?;
///     Ok(Redirect::to("/cart"))
/// }
/// ```
pub struct Visitor {
    pub session: Session,
    pub store: CartStore<SessionStorage>,
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer missing".to_string()))?;

        let storage = SessionStorage::load(&session).await?;
        Ok(Self {
            session,
            store: CartStore::hydrate(storage),
        })
    }
}

impl Visitor {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.store.user()
    }

    /// Bearer token for backend calls.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.store.token()
    }

    /// Persist store changes into the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save(&self) -> Result<(), AppError> {
        let storage = self.store.storage();
        if storage.is_dirty() {
            storage.flush(&self.session).await?;
        }
        Ok(())
    }

    /// Queue a toast for the next rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn flash(&self, flash: Flash) -> Result<(), AppError> {
        push_flash(&self.session, flash).await
    }

    /// Enforce the minimum gap between create submissions, recording this one.
    ///
    /// # Errors
    ///
    /// Returns `Ok(Err(TooSoon))` when the previous submission was too recent;
    /// the outer error is a session failure.
    pub async fn throttle_submit(&self) -> Result<Result<(), ValidationError>, AppError> {
        let now = Utc::now();
        let last: Option<DateTime<Utc>> = self.session.get(session_keys::LAST_SUBMIT).await?;
        if let Err(e) = check_submit_interval(last, now) {
            return Ok(Err(e));
        }
        self.session.insert(session_keys::LAST_SUBMIT, now).await?;
        Ok(Ok(()))
    }
}

/// Append a toast to the session's queue.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn push_flash(session: &Session, flash: Flash) -> Result<(), AppError> {
    let mut queue: Vec<Flash> = session
        .get(session_keys::FLASH)
        .await?
        .unwrap_or_default();
    queue.push(flash);
    session.insert(session_keys::FLASH, queue).await?;
    Ok(())
}

/// Remove and return every queued toast.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>, AppError> {
    Ok(session
        .remove::<Vec<Flash>>(session_keys::FLASH)
        .await?
        .unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use luxe_core::{NewCartItem, Price, ProductId};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn vase() -> NewCartItem {
        NewCartItem {
            id: ProductId::new("vase"),
            name: "گلدان".into(),
            price: Price::toman(250_000),
            image: String::new(),
            stock: None,
        }
    }

    #[tokio::test]
    async fn test_store_survives_across_requests() {
        let session = session();

        let mut store = CartStore::hydrate(SessionStorage::load(&session).await.unwrap());
        store.add_to_cart(vase());
        store.add_to_cart(vase());
        store.storage().flush(&session).await.unwrap();

        let store = CartStore::hydrate(SessionStorage::load(&session).await.unwrap());
        assert_eq!(store.item_count(), 2);
    }

    #[tokio::test]
    async fn test_logout_removes_session_keys() {
        let session = session();

        let mut store = CartStore::hydrate(SessionStorage::load(&session).await.unwrap());
        store.set_token("abc");
        store.login("09120000000", None, None);
        store.add_to_cart(vase());
        store.storage().flush(&session).await.unwrap();
        assert_eq!(
            session.get::<String>(keys::AUTH_TOKEN).await.unwrap().as_deref(),
            Some("abc")
        );

        let mut store = CartStore::hydrate(SessionStorage::load(&session).await.unwrap());
        store.logout();
        store.storage().flush(&session).await.unwrap();

        for key in keys::ALL {
            assert!(session.get::<String>(key).await.unwrap().is_none(), "{key}");
        }
    }

    #[tokio::test]
    async fn test_untouched_storage_is_clean() {
        let session = session();
        let store = CartStore::hydrate(SessionStorage::load(&session).await.unwrap());
        assert!(!store.storage().is_dirty());
    }

    #[tokio::test]
    async fn test_flashes_are_taken_once() {
        let session = session();
        push_flash(&session, Flash::success("ok")).await.unwrap();
        push_flash(&session, Flash::error("bad")).await.unwrap();

        let flashes = take_flashes(&session).await.unwrap();
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[1].message, "bad");
        assert!(take_flashes(&session).await.unwrap().is_empty());
    }
}
