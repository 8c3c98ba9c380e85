//! Session middleware configuration for admin.
//!
//! In-memory sessions with stricter cookie settings than the storefront
//! (`SameSite=Strict`, 24 hour inactivity expiry).

use axum::Router;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use thiserror::Error;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "luxe_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// The signing key could not be built from the session secret.
#[derive(Debug, Error)]
#[error("Invalid session signing key: {0}")]
pub struct SessionKeyError(String);

/// Derive the cookie signing key from the session secret.
///
/// # Errors
///
/// Returns an error if the derived key is rejected by the cookie crate.
pub fn signing_key(config: &AdminConfig) -> Result<Key, SessionKeyError> {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::try_from(digest.as_slice()).map_err(|e| SessionKeyError(e.to_string()))
}

/// Wrap `router` with the admin session layer.
///
/// # Errors
///
/// Returns an error if the signing key cannot be derived.
pub fn with_session_layer(router: Router, config: &AdminConfig) -> Result<Router, SessionKeyError> {
    let layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config)?);

    Ok(router.layer(layer))
}
