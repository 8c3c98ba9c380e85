//! Profile route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use luxe_client::{Envelope, ProfileUpdate};
use luxe_core::types::price::persian_digits;
use luxe_core::validation::AddressDraft;
use luxe_core::{Address, User};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user};
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::{Flash, PageContext};
use crate::state::AppState;

/// Toast after the profile was saved.
pub const PROFILE_UPDATED: &str = "پروفایل با موفقیت به‌روزرسانی شد";
/// Toast after an address was added.
pub const ADDRESS_ADDED: &str = "آدرس با موفقیت اضافه شد";

const PROFILE_FAILED: &str = "خطا در به‌روزرسانی پروفایل";
const ADDRESS_FAILED: &str = "خطا در ایجاد آدرس";

/// Address display data for templates.
#[derive(Debug, Clone)]
pub struct AddressView {
    pub name: String,
    pub address: String,
    pub postal_code: String,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            name: address.name.clone(),
            address: address.address.clone(),
            postal_code: persian_digits(&address.postal_code),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub is_admin: bool,
    pub addresses: Vec<AddressView>,
}

impl ProfileTemplate {
    fn new(page: PageContext, user: &User) -> Self {
        Self {
            page,
            phone: persian_digits(&user.phone),
            first_name: user.first_name.clone().unwrap_or_default(),
            last_name: user.last_name.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            username: user.username.clone(),
            is_admin: user.is_admin(),
            addresses: user.addresses.iter().map(AddressView::from).collect(),
        }
    }
}

/// Profile form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
}

impl From<ProfileForm> for ProfileUpdate {
    fn from(form: ProfileForm) -> Self {
        Self {
            first_name: form.first_name.trim().to_owned(),
            last_name: form.last_name.trim().to_owned(),
            email: form.email.trim().to_owned(),
            username: form.username.trim().to_owned(),
        }
    }
}

/// Display the signed-in visitor's profile.
#[instrument(skip(visitor))]
pub async fn show(RequireUser(visitor): RequireUser) -> Result<ProfileTemplate> {
    let page = PageContext::load(&visitor).await?;
    let user = visitor
        .user()
        .ok_or_else(|| crate::error::AppError::Unauthorized("no user".to_string()))?;
    Ok(ProfileTemplate::new(page, user))
}

/// Save the profile.
///
/// When the backend returns the updated user, the visitor is signed out so
/// the next sign-in picks up the new profile.
#[instrument(skip(state, visitor, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(mut visitor): RequireUser,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect> {
    let token = visitor.token();
    let result = state
        .api()
        .with_token(token.as_deref())
        .update_me(&ProfileUpdate::from(form))
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(envelope) => {
            visitor.flash(Flash::success(PROFILE_UPDATED)).await?;
            if envelope.data.is_some_and(|d| d.user.is_some()) {
                visitor.store.logout();
                visitor.save().await?;
                clear_sentry_user();
                return Ok(Redirect::to("/register"));
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to update profile");
            visitor.flash(Flash::error(PROFILE_FAILED)).await?;
        }
    }
    Ok(Redirect::to("/profile"))
}

/// Add an address to the visitor's account.
#[instrument(skip(state, visitor, form))]
pub async fn create_address(
    State(state): State<AppState>,
    RequireUser(mut visitor): RequireUser,
    Form(form): Form<AddressDraft>,
) -> Result<Redirect> {
    let address = match form.validate() {
        Ok(address) => address,
        Err(e) => {
            visitor.flash(Flash::error(e.to_string())).await?;
            return Ok(Redirect::to("/profile"));
        }
    };
    if let Err(e) = visitor.throttle_submit().await? {
        visitor.flash(Flash::error(e.to_string())).await?;
        return Ok(Redirect::to("/profile"));
    }

    let token = visitor.token();
    let result = state
        .api()
        .with_token(token.as_deref())
        .create_address(&address)
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(envelope) => {
            let saved = envelope
                .data
                .as_ref()
                .and_then(|d| d.newest_address())
                .cloned()
                .unwrap_or(address);
            visitor.store.add_address(saved);
            visitor.save().await?;
            visitor.flash(Flash::success(ADDRESS_ADDED)).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create address");
            visitor
                .flash(Flash::error(e.user_message_or(ADDRESS_FAILED)))
                .await?;
        }
    }
    Ok(Redirect::to("/profile"))
}
