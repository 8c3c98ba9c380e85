//! Admin sign-in via phone and OTP.
//!
//! The backend flow is the storefront's; only users passing
//! [`grants_admin`] get past `/unauthorized` afterwards.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use luxe_client::Envelope;
use luxe_core::Phone;
use luxe_core::types::price::{latin_digits, persian_digits};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{AdminSession, grants_admin};
use crate::models::{Flash, PageContext, session_keys};
use crate::state::AppState;

/// Toast after the code was sent.
pub const CODE_SENT: &str = "کد تایید به شماره موبایل شما ارسال شد";
/// Toast after an admin signed in.
pub const WELCOME: &str = "خوش آمدید";

const SEND_FAILED: &str = "خطا در ارسال کد تایید";
const VERIFY_FAILED: &str = "خطا در تایید کد";
const CODE_REQUIRED: &str = "کد تایید را وارد کنید";
const SIGNED_OUT: &str = "از پنل مدیریت خارج شدید";

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub pending_phone: String,
    pub awaiting_code: bool,
}

/// Shown to signed-in users without admin access.
#[derive(Template, WebTemplate)]
#[template(path = "auth/unauthorized.html")]
pub struct UnauthorizedTemplate {
    pub page: PageContext,
    pub signed_in: bool,
}

/// Phone step form data.
#[derive(Debug, Deserialize)]
pub struct SendCodeForm {
    pub phone: String,
}

/// Code step form data.
#[derive(Deserialize)]
pub struct VerifyCodeForm {
    pub otp: String,
}

/// Display the login page; admins already signed in go to the dashboard.
#[instrument(skip(state, session))]
pub async fn login_page(State(state): State<AppState>, session: AdminSession) -> Result<Response> {
    let first_admin = state.config().first_admin_phone.as_deref();
    if session.user().is_some_and(|u| grants_admin(u, first_admin)) {
        return Ok(Redirect::to("/").into_response());
    }

    let page = PageContext::load(&session).await?;
    let pending: Option<String> = session.session.get(session_keys::PENDING_PHONE).await?;

    Ok(LoginTemplate {
        page,
        awaiting_code: pending.is_some(),
        pending_phone: pending.map(|p| persian_digits(&p)).unwrap_or_default(),
    }
    .into_response())
}

/// Ask the backend to text a code to the submitted phone.
#[instrument(skip(state, session, form))]
pub async fn send_code(
    State(state): State<AppState>,
    session: AdminSession,
    Form(form): Form<SendCodeForm>,
) -> Result<Redirect> {
    let phone = match Phone::parse(&form.phone) {
        Ok(phone) => phone,
        Err(e) => {
            session.flash(Flash::error(e.to_string())).await?;
            return Ok(Redirect::to("/login"));
        }
    };

    let sent = state
        .api()
        .anonymous()
        .send_otp(phone.as_str())
        .await
        .and_then(Envelope::ensure_success);

    if let Err(e) = sent {
        tracing::warn!(error = %e, "Failed to send admin OTP");
        session
            .flash(Flash::error(e.user_message_or(SEND_FAILED)))
            .await?;
    } else {
        session
            .session
            .insert(session_keys::PENDING_PHONE, phone.as_str())
            .await?;
        session.flash(Flash::success(CODE_SENT)).await?;
    }
    Ok(Redirect::to("/login"))
}

/// Verify the code, sign the user in, and send them to the dashboard when
/// they have admin access.
#[instrument(skip(state, session, form))]
pub async fn verify_code(
    State(state): State<AppState>,
    mut session: AdminSession,
    Form(form): Form<VerifyCodeForm>,
) -> Result<Redirect> {
    let Some(phone) = session
        .session
        .get::<String>(session_keys::PENDING_PHONE)
        .await?
    else {
        session.flash(Flash::error(VERIFY_FAILED)).await?;
        return Ok(Redirect::to("/login"));
    };

    let otp = latin_digits(form.otp.trim());
    if otp.is_empty() {
        session.flash(Flash::error(CODE_REQUIRED)).await?;
        return Ok(Redirect::to("/login"));
    }

    let data = match state
        .api()
        .anonymous()
        .verify_otp(&phone, &otp)
        .await
        .and_then(Envelope::into_data)
    {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "Admin OTP verification failed");
            session
                .flash(Flash::error(e.user_message_or(VERIFY_FAILED)))
                .await?;
            return Ok(Redirect::to("/login"));
        }
    };
    let Some(token) = data.token.filter(|t| !t.is_empty()) else {
        session.flash(Flash::error(VERIFY_FAILED)).await?;
        return Ok(Redirect::to("/login"));
    };

    let roles = data.user.as_ref().and_then(|u| u.roles.clone());
    session.store.set_token(&token);
    session.store.login(&phone, roles, data.user);
    session.save().await?;
    session
        .session
        .remove::<String>(session_keys::PENDING_PHONE)
        .await?;

    let first_admin = state.config().first_admin_phone.as_deref();
    let Some(user) = session.user() else {
        return Ok(Redirect::to("/login"));
    };
    if !grants_admin(user, first_admin) {
        tracing::warn!(user_id = %user.id, "Signed-in user is not an admin");
        return Ok(Redirect::to("/unauthorized"));
    }

    set_sentry_user(&user.id, &user.phone);
    tracing::info!(user_id = %user.id, "Admin signed in");
    session.flash(Flash::success(WELCOME)).await?;
    Ok(Redirect::to("/"))
}

/// Sign out and return to the login page.
#[instrument(skip(session))]
pub async fn logout(mut session: AdminSession) -> Result<Redirect> {
    session.store.logout();
    session.save().await?;
    clear_sentry_user();
    session.flash(Flash::info(SIGNED_OUT)).await?;
    Ok(Redirect::to("/login"))
}

/// Explain that the account has no admin access.
#[instrument(skip(session))]
pub async fn unauthorized(session: AdminSession) -> Result<impl IntoResponse> {
    let page = PageContext::load(&session).await?;
    let template = UnauthorizedTemplate {
        page,
        signed_in: session.user().is_some(),
    };
    Ok((StatusCode::FORBIDDEN, template))
}
