//! Authentication extractors.
//!
//! A visitor counts as signed in when the cart store holds a user.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use crate::error::AppError;
use crate::middleware::visitor::Visitor;
use crate::models::Flash;

/// Shown when an anonymous visitor opens a page that needs an account.
pub const LOGIN_FIRST: &str = "برای ادامه، ابتدا وارد حساب کاربری خود شوید";

/// Extractor that requires a signed-in visitor.
///
/// Anonymous visitors are redirected to `/register` with a toast.
///
/// # Example
///
/// ```rust,ignore
/// async fn checkout(RequireUser(visitor): RequireUser) -> impl IntoResponse {
///     let user = visitor.user();
///     // ...
/// }
/// ```
pub struct RequireUser(pub Visitor);

/// Error returned when a page needs a signed-in visitor.
pub enum AuthRejection {
    /// Redirect to the registration page.
    RedirectToRegister,
    /// Session failure while checking.
    Error(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToRegister => Redirect::to("/register").into_response(),
            Self::Error(err) => err.into_response(),
        }
    }
}

impl From<AppError> for AuthRejection {
    fn from(err: AppError) -> Self {
        Self::Error(err)
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let visitor = Visitor::from_request_parts(parts, state).await?;

        if visitor.user().is_none() {
            visitor.flash(Flash::info(LOGIN_FIRST)).await?;
            return Err(AuthRejection::RedirectToRegister);
        }

        Ok(Self(visitor))
    }
}
