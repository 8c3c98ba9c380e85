//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! GET  /login                                   - Phone/OTP form
//! POST /login/send                              - Send OTP (rate limited)
//! POST /login/verify                            - Verify OTP (rate limited)
//! POST /logout                                  - Sign out
//! GET  /unauthorized                            - Signed in without admin access
//!
//! # Dashboard (admin only)
//! GET  /?tab=users|products|collections|comments
//! GET  /notifications                           - Fragment, polled every 30 s
//! POST /notifications/{id}/read
//! POST /notifications/read-all
//! POST /users/{id}/ban
//! POST /users/{id}/unban
//! POST /products                                - Create (multipart)
//! POST /products/{id}                           - Update (multipart)
//! POST /products/{id}/delete
//! POST /collections                             - Create
//! POST /collections/{id}                        - Update
//! POST /collections/{id}/delete
//! POST /comments/{id}/status
//! POST /comments/{id}/delete
//! POST /comments/{id}/replies/{reply_id}/status
//! POST /comments/{id}/replies/{reply_id}/delete
//! GET  /reports                                 - User statistics
//! GET  /reports/cards                           - Cards fragment, refreshed every 30 s
//! ```

pub mod auth;
pub mod collections;
pub mod comments;
pub mod dashboard;
pub mod notifications;
pub mod products;
pub mod reports;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderMap,
    routing::{get, post},
};
use luxe_client::{ApiError, Envelope, Page};

use crate::middleware::otp_rate_limiter;
use crate::state::AppState;

/// Upper bound for a product form with its images.
const PRODUCT_UPLOAD_LIMIT: usize = 20 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let otp = Router::new()
        .route("/login/send", post(auth::send_code))
        .route("/login/verify", post(auth::verify_code))
        .layer(otp_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .route("/unauthorized", get(auth::unauthorized))
        .merge(otp)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create))
        .route("/{id}", post(products::update))
        .route("/{id}/delete", post(products::delete))
        .layer(DefaultBodyLimit::max(PRODUCT_UPLOAD_LIMIT))
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(collections::create))
        .route("/{id}", post(collections::update))
        .route("/{id}/delete", post(collections::delete))
}

/// Create the comment moderation routes router.
pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}/status", post(comments::set_status))
        .route("/{id}/delete", post(comments::delete))
        .route(
            "/{id}/replies/{reply_id}/status",
            post(comments::set_reply_status),
        )
        .route("/{id}/replies/{reply_id}/delete", post(comments::delete_reply))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/notifications", get(notifications::panel))
        .route("/notifications/read-all", post(notifications::read_all))
        .route("/notifications/{id}/read", post(notifications::read))
        .route("/users/{id}/ban", post(users::ban))
        .route("/users/{id}/unban", post(users::unban))
        .nest("/products", product_routes())
        .nest("/collections", collection_routes())
        .nest("/comments", comment_routes())
        .route("/reports", get(reports::page))
        .route("/reports/cards", get(reports::cards))
        .merge(auth_routes())
}

/// Unwrap a list response; `success: false` counts as a failure.
pub(crate) fn into_page<T>(
    result: Result<Envelope<Page<T>>, ApiError>,
) -> Result<Page<T>, ApiError> {
    result.and_then(Envelope::into_data)
}

/// Whether the request was issued by htmx.
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// A dashboard path to go back to after an action, else `default`.
pub(crate) fn return_path(candidate: Option<&str>, default: &str) -> String {
    candidate
        .filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
        .unwrap_or(default)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_path_stays_on_site() {
        assert_eq!(
            return_path(Some("/?tab=users&page=2"), "/"),
            "/?tab=users&page=2"
        );
        assert_eq!(return_path(Some("//evil.example/"), "/"), "/");
        assert_eq!(return_path(Some("javascript:alert(1)"), "/?tab=users"), "/?tab=users");
        assert_eq!(return_path(None, "/?tab=comments"), "/?tab=comments");
    }
}
