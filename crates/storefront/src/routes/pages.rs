//! About page and contact form handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use luxe_core::validation::ContactDraft;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::Visitor;
use crate::models::{Flash, PageContext};
use crate::state::AppState;

/// Toast after a contact message was delivered.
pub const MESSAGE_SENT: &str = "پیام شما با موفقیت ارسال شد";

const MESSAGE_FAILED: &str = "خطا در ارسال پیام";

/// About page template, including the contact form.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub page: PageContext,
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// Display the about page; the contact form is prefilled for signed-in visitors.
#[instrument(skip(visitor))]
pub async fn about(visitor: Visitor) -> Result<AboutTemplate> {
    let page = PageContext::load(&visitor).await?;
    let user = visitor.user();

    Ok(AboutTemplate {
        page,
        name: user
            .map(luxe_core::User::display_name)
            .unwrap_or_default(),
        phone: user.map(|u| u.phone.clone()).unwrap_or_default(),
        email: user.and_then(|u| u.email.clone()).unwrap_or_default(),
    })
}

/// Send the contact form to the backend.
#[instrument(skip(state, visitor, form))]
pub async fn contact(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<ContactDraft>,
) -> Result<Redirect> {
    let message = match form.validate() {
        Ok(message) => message,
        Err(e) => {
            visitor.flash(Flash::error(e.to_string())).await?;
            return Ok(Redirect::to("/about#contact"));
        }
    };

    let result = state
        .api()
        .anonymous()
        .send_contact(&message)
        .await
        .and_then(luxe_client::Envelope::ensure_success);

    match result {
        Ok(_) => visitor.flash(Flash::success(MESSAGE_SENT)).await?,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to send contact message");
            visitor
                .flash(Flash::error(e.user_message_or(MESSAGE_FAILED)))
                .await?;
        }
    }
    Ok(Redirect::to("/about#contact"))
}
