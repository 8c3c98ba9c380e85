//! Admin access extractor.
//!
//! Access is granted to users holding the `ADMIN` role, or whose phone is
//! the configured bootstrap admin phone.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use luxe_core::User;
use luxe_core::types::phone::strip_account_prefix;

use crate::error::AppError;
use crate::middleware::admin_session::AdminSession;
use crate::state::AppState;

/// Whether `user` may use the admin panel.
#[must_use]
pub fn grants_admin(user: &User, first_admin_phone: Option<&str>) -> bool {
    user.is_admin()
        || first_admin_phone
            .filter(|p| !p.is_empty())
            .is_some_and(|p| p == user.phone || p == strip_account_prefix(&user.phone))
}

/// Extractor that requires a signed-in admin.
///
/// Anonymous requests go to `/login`; signed-in users without access go to
/// `/unauthorized`. htmx requests get an `HX-Redirect` instead, so a polled
/// fragment never swaps a whole page in.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     admin.user().map(|u| u.display_name())
/// }
/// ```
pub struct RequireAdmin(pub AdminSession);

/// Rejection for [`RequireAdmin`].
pub enum AdminRejection {
    Redirect { to: &'static str, htmx: bool },
    Error(AppError),
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect { to, htmx: true } => {
                (StatusCode::UNAUTHORIZED, [("HX-Redirect", to)]).into_response()
            }
            Self::Redirect { to, htmx: false } => Redirect::to(to).into_response(),
            Self::Error(err) => err.into_response(),
        }
    }
}

impl From<AppError> for AdminRejection {
    fn from(err: AppError) -> Self {
        Self::Error(err)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AdminSession::from_request_parts(parts, state).await?;
        let htmx = parts.headers.contains_key("hx-request");

        let Some(user) = session.user() else {
            return Err(AdminRejection::Redirect { to: "/login", htmx });
        };
        if !grants_admin(user, state.config().first_admin_phone.as_deref()) {
            tracing::warn!(user_id = %user.id, "Non-admin user denied");
            return Err(AdminRejection::Redirect {
                to: "/unauthorized",
                htmx,
            });
        }

        Ok(Self(session))
    }
}

#[cfg(test)]
mod tests {
    use luxe_core::Role;

    use super::*;

    fn user(phone: &str, roles: Vec<Role>) -> User {
        User {
            id: luxe_core::UserId::new("u1"),
            phone: phone.to_string(),
            username: phone.to_string(),
            first_name: None,
            last_name: None,
            email: None,
            roles,
            addresses: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_admin_role_grants_access() {
        assert!(grants_admin(&user("09120000000", vec![Role::User, Role::Admin]), None));
    }

    #[test]
    fn test_first_admin_phone_grants_access() {
        let plain = user("09121234567", vec![Role::User]);
        assert!(grants_admin(&plain, Some("09121234567")));
        assert!(!grants_admin(&plain, Some("09120000000")));
        assert!(!grants_admin(&plain, None));
        assert!(!grants_admin(&plain, Some("")));
    }
}
