//! Phone/OTP sign-in route handlers.
//!
//! Registration and sign-in are the same flow: the visitor enters a phone,
//! the backend texts a code, and verifying the code returns a bearer token
//! plus the user's profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use luxe_client::Envelope;
use luxe_core::{Phone, User};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::Visitor;
use crate::models::{Flash, PageContext, session_keys};
use crate::state::AppState;

/// Toast after the code was sent.
pub const CODE_SENT: &str = "کد تایید به شماره موبایل شما ارسال شد";
/// Toast after a successful sign-in.
pub const SIGNED_IN: &str = "ثبت نام با موفقیت انجام شد!";
/// Toast after a successful sign-in by an admin.
pub const SIGNED_IN_ADMIN: &str = "ثبت نام با موفقیت انجام شد! شما ادمین هستید.";

const SEND_FAILED: &str = "خطا در ارسال کد تایید";
const VERIFY_FAILED: &str = "خطا در تایید کد";
const CODE_REQUIRED: &str = "کد تایید را وارد کنید";
const SIGNED_OUT: &str = "از حساب کاربری خود خارج شدید";

/// Register page template: phone step, or code step once a code was sent.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub pending_phone: String,
    pub awaiting_code: bool,
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

/// Display the register page; signed-in visitors go to their profile.
#[instrument(skip(visitor))]
pub async fn register_page(visitor: Visitor) -> Result<Response> {
    if visitor.user().is_some() {
        return Ok(Redirect::to("/profile").into_response());
    }

    let page = PageContext::load(&visitor).await?;
    let pending_phone: Option<String> = visitor.session.get(session_keys::PENDING_PHONE).await?;

    Ok(RegisterTemplate {
        page,
        awaiting_code: pending_phone.is_some(),
        pending_phone: pending_phone.unwrap_or_default(),
    }
    .into_response())
}

/// Ask the backend to text a code to the submitted phone.
#[instrument(skip(state, visitor, form))]
pub async fn send_code(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<SendCodeForm>,
) -> Result<Redirect> {
    let phone = match Phone::parse(&form.phone) {
        Ok(phone) => phone,
        Err(e) => {
            visitor.flash(Flash::error(e.to_string())).await?;
            return Ok(Redirect::to("/register"));
        }
    };

    let result = state
        .api()
        .anonymous()
        .send_otp(phone.as_str())
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!("OTP sent");
            visitor
                .session
                .insert(session_keys::PENDING_PHONE, phone.as_str())
                .await?;
            visitor.flash(Flash::success(CODE_SENT)).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to send OTP");
            visitor
                .flash(Flash::error(e.user_message_or(SEND_FAILED)))
                .await?;
        }
    }
    Ok(Redirect::to("/register"))
}

/// Verify the code and sign the visitor in.
#[instrument(skip(state, visitor, form))]
pub async fn verify_code(
    State(state): State<AppState>,
    mut visitor: Visitor,
    Form(form): Form<VerifyCodeForm>,
) -> Result<Redirect> {
    let Some(phone) = visitor
        .session
        .get::<String>(session_keys::PENDING_PHONE)
        .await?
    else {
        visitor.flash(Flash::error(VERIFY_FAILED)).await?;
        return Ok(Redirect::to("/register"));
    };

    let otp = luxe_core::types::price::latin_digits(form.otp.trim());
    if otp.is_empty() {
        visitor.flash(Flash::error(CODE_REQUIRED)).await?;
        return Ok(Redirect::to("/register"));
    }

    let verified = state
        .api()
        .anonymous()
        .verify_otp(&phone, &otp)
        .await
        .and_then(Envelope::into_data);

    let data = match verified {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "OTP verification failed");
            visitor
                .flash(Flash::error(e.user_message_or(VERIFY_FAILED)))
                .await?;
            return Ok(Redirect::to("/register"));
        }
    };
    let Some(token) = data.token.filter(|t| !t.is_empty()) else {
        tracing::warn!("OTP verification returned no token");
        visitor.flash(Flash::error(VERIFY_FAILED)).await?;
        return Ok(Redirect::to("/register"));
    };

    let login_phone = data
        .user
        .as_ref()
        .and_then(|u| u.phone.clone())
        .unwrap_or_else(|| phone.clone());
    let roles = data.user.as_ref().and_then(|u| u.roles.clone());

    visitor.store.set_token(&token);
    visitor.store.login(&login_phone, roles, data.user);
    visitor.save().await?;
    visitor
        .session
        .remove::<String>(session_keys::PENDING_PHONE)
        .await?;

    let is_admin = visitor.user().is_some_and(User::is_admin);
    if let Some(user) = visitor.user() {
        set_sentry_user(&user.id, Some(&user.phone));
    }
    add_breadcrumb("auth", "Signed in", None);

    let message = if is_admin { SIGNED_IN_ADMIN } else { SIGNED_IN };
    visitor.flash(Flash::success(message)).await?;
    Ok(Redirect::to("/profile"))
}

/// Sign out: forget the user, the token and the cart.
#[instrument(skip(visitor))]
pub async fn logout(mut visitor: Visitor) -> Result<Redirect> {
    visitor.store.logout();
    visitor.save().await?;
    clear_sentry_user();
    visitor.flash(Flash::info(SIGNED_OUT)).await?;
    Ok(Redirect::to("/"))
}
