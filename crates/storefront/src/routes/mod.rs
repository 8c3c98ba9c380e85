//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home page
//! GET  /shop                          - Shop with filters
//! GET  /product/{id}                  - Product detail
//! POST /product/{id}/comments         - New comment (signed in)
//! POST /product/{id}/comments/{cid}/reply - Reply to a comment (signed in)
//!
//! # Collections
//! GET  /collections                   - Collection list
//! GET  /collection/{slug}             - Collection detail, grouped by section
//! GET  /collections/lighting          - Lighting products
//! GET  /collections/new               - Newest products
//!
//! # Cart (HTMX fragments when requested by htmx)
//! GET  /cart                          - Cart page
//! POST /cart/add                      - Add one unit
//! POST /cart/update                   - Set quantity
//! POST /cart/remove                   - Remove a line
//! POST /cart/clear                    - Empty the cart
//! GET  /cart/count                    - Badge fragment
//!
//! # Checkout (signed in)
//! GET  /checkout                      - Checkout form
//! POST /checkout                      - Submit (no order is placed)
//!
//! # Account
//! GET  /register                      - Phone/OTP form
//! POST /register/send                 - Send OTP (rate limited)
//! POST /register/verify               - Verify OTP (rate limited)
//! POST /logout                        - Sign out
//! GET  /profile                       - Profile (signed in)
//! POST /profile                       - Update profile
//! POST /profile/addresses             - Add address
//!
//! # Pages
//! GET  /about                         - About + contact form
//! GET  /contact                       - Same as /about
//! POST /contact                       - Contact form
//! ```

pub mod auth;
pub mod cart;
pub mod collections;
pub mod home;
pub mod pages;
pub mod products;
pub mod profile;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};
use luxe_client::{ApiError, Envelope, Page};

use crate::middleware::otp_rate_limiter;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/comments", post(products::create_comment))
        .route(
            "/{id}/comments/{comment_id}/reply",
            post(products::create_reply),
        )
}

/// Create the collection routes router.
pub fn collection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(collections::index))
        .route("/lighting", get(collections::lighting))
        .route("/new", get(collections::newest))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    let otp = Router::new()
        .route("/register/send", post(auth::send_code))
        .route("/register/verify", post(auth::verify_code))
        .layer(otp_rate_limiter());

    Router::new()
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .route("/profile", get(profile::show).post(profile::update))
        .route("/profile/addresses", post(profile::create_address))
        .merge(otp)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/shop", get(products::shop))
        .nest("/product", product_routes())
        .nest("/collections", collection_routes())
        .route("/collection/{slug}", get(collections::show))
        .nest("/cart", cart_routes())
        .route("/checkout", get(cart::checkout).post(cart::submit_checkout))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::about).post(pages::contact))
        .merge(account_routes())
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

/// A same-site path to redirect to after a form post, else `default`.
pub(crate) fn safe_return_path(candidate: Option<&str>, default: &str) -> String {
    candidate
        .filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
        .unwrap_or(default)
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_path() {
        assert_eq!(safe_return_path(Some("/shop?sort=price-asc"), "/cart"), "/shop?sort=price-asc");
        assert_eq!(safe_return_path(Some("//evil.example"), "/cart"), "/cart");
        assert_eq!(safe_return_path(Some("https://evil.example"), "/cart"), "/cart");
        assert_eq!(safe_return_path(None, "/cart"), "/cart");
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", "true".parse().unwrap_or_else(|_| unreachable!()));
        assert!(is_htmx(&headers));
    }
}
