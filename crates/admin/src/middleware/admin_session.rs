//! The signed-in admin, backed by their session.
//!
//! The admin is stored through the same [`CartStore`] keys as a storefront
//! visitor, so a login on either site produces the same session shape.

use std::collections::{HashMap, HashSet};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use luxe_client::{Api, ApiClient};
use luxe_core::User;
use luxe_core::store::{CartStore, KeyValueStorage, keys};
use luxe_core::validation::{ValidationError, check_submit_interval};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{Flash, session_keys};

/// Key/value storage over the session's store keys.
///
/// Values are read once per request; only keys written since then are
/// flushed back.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    values: HashMap<String, String>,
    changed: HashSet<String>,
}

impl SessionStorage {
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        let mut storage = Self::default();
        for key in keys::ALL {
            if let Some(value) = session.get::<String>(key).await? {
                storage.values.insert(key.to_owned(), value);
            }
        }
        Ok(storage)
    }

    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn flush(&self, session: &Session) -> Result<(), tower_sessions::session::Error> {
        for key in &self.changed {
            if let Some(value) = self.values.get(key) {
                session.insert(key, value).await?;
            } else {
                session.remove::<String>(key).await?;
            }
        }
        Ok(())
    }
}

impl KeyValueStorage for SessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.changed.insert(key.to_owned());
        self.values.insert(key.to_owned(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.changed.insert(key.to_owned());
        self.values.remove(key);
    }
}

/// Session plus the hydrated store, for any admin request.
///
/// Use [`crate::middleware::RequireAdmin`] on pages that need an admin.
pub struct AdminSession {
    pub session: Session,
    pub store: CartStore<SessionStorage>,
    token: Option<String>,
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("Session layer missing".to_string()))?;

        let store = CartStore::hydrate(SessionStorage::load(&session).await?);
        let token = store.token();
        Ok(Self {
            session,
            store,
            token,
        })
    }
}

impl AdminSession {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.store.user()
    }

    /// Backend calls authorized with the token this request arrived with.
    #[must_use]
    pub fn api<'a>(&'a self, client: &'a ApiClient) -> Api<'a> {
        client.with_token(self.token.as_deref())
    }

    /// Persist store changes into the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn save(&self) -> Result<(), AppError> {
        self.store.storage().flush(&self.session).await?;
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

    use luxe_core::Role;
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_login_persists_token_and_roles() {
        let session = session();

        let mut store = CartStore::hydrate(SessionStorage::load(&session).await.unwrap());
        store.set_token("admin-token");
        store.login("09120000000", Some(vec![Role::Admin]), None);
        store.storage().flush(&session).await.unwrap();

        let store = CartStore::hydrate(SessionStorage::load(&session).await.unwrap());
        assert_eq!(store.token().as_deref(), Some("admin-token"));
        assert!(store.user().unwrap().is_admin());
    }

    #[tokio::test]
    async fn test_unchanged_keys_are_not_written() {
        let session = session();
        session.insert(keys::AUTH_TOKEN, "kept").await.unwrap();

        let storage = SessionStorage::load(&session).await.unwrap();
        session.remove::<String>(keys::AUTH_TOKEN).await.unwrap();
        storage.flush(&session).await.unwrap();

        assert!(session.get::<String>(keys::AUTH_TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_flashes_are_taken_once() {
        let session = session();
        push_flash(&session, Flash::success("کامنت تایید شد")).await.unwrap();

        assert_eq!(take_flashes(&session).await.unwrap().len(), 1);
        assert!(take_flashes(&session).await.unwrap().is_empty());
    }
}
