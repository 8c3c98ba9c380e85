//! Notification panel shown in the admin header.
//!
//! The panel is an htmx fragment polled from the layout. Fetch failures
//! render an empty panel instead of an error toast, since the panel
//! refreshes itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use luxe_client::Envelope;
use luxe_core::types::notification::unread_count;
use luxe_core::types::price::persian_digits;
use luxe_core::{Notification, NotificationId};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{AdminSession, RequireAdmin};
use crate::models::Flash;
use crate::models::bans::display_date;
use crate::routes::{into_page, is_htmx};
use crate::state::AppState;

/// Seconds between panel refreshes.
pub const NOTIFICATION_POLL_SECS: u64 = 30;

/// Notifications requested per refresh.
const FETCH_LIMIT: u32 = 20;

/// Notifications listed in the panel.
pub const PANEL_SIZE: usize = 10;

const MARK_FAILED: &str = "خطا در به‌روزرسانی اعلان‌ها";

/// A notification in the panel.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub id: String,
    pub icon: &'static str,
    pub tone: &'static str,
    pub title: String,
    pub message: String,
    pub date: String,
    pub read: bool,
}

impl From<&Notification> for NotificationView {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            icon: notification.kind.icon(),
            tone: notification.kind.tone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            date: display_date(notification.created_at),
            read: notification.read,
        }
    }
}

/// Notification panel fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/notifications.html")]
pub struct NotificationsTemplate {
    pub notifications: Vec<NotificationView>,
    pub unread: usize,
    pub unread_label: String,
}

impl NotificationsTemplate {
    fn new(notifications: &[Notification]) -> Self {
        let unread = unread_count(notifications);
        Self {
            notifications: notifications
                .iter()
                .take(PANEL_SIZE)
                .map(NotificationView::from)
                .collect(),
            unread,
            unread_label: persian_digits(&unread.to_string()),
        }
    }
}

async fn load_panel(state: &AppState, admin: &AdminSession) -> NotificationsTemplate {
    let fetched = admin
        .api(state.api())
        .list_notifications(Some(1), Some(FETCH_LIMIT))
        .await;
    match into_page(fetched) {
        Ok(list) => NotificationsTemplate::new(&list.items),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch notifications");
            NotificationsTemplate::new(&[])
        }
    }
}

/// Render the notification panel.
#[instrument(skip(state, admin))]
pub async fn panel(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> NotificationsTemplate {
    load_panel(&state, &admin).await
}

/// Answer a mark-read action: the refreshed panel for htmx, else back to
/// the dashboard with a toast on failure.
async fn marked(
    state: &AppState,
    admin: &AdminSession,
    headers: &HeaderMap,
    result: std::result::Result<luxe_client::Ack, luxe_client::ApiError>,
) -> Result<Response> {
    let failed = match result.and_then(Envelope::ensure_success) {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to mark notifications read");
            Some(e.user_message_or(MARK_FAILED))
        }
    };

    if is_htmx(headers) {
        return Ok(load_panel(state, admin).await.into_response());
    }
    if let Some(message) = failed {
        admin.flash(Flash::error(message)).await?;
    }
    Ok(Redirect::to("/").into_response())
}

/// Mark one notification read.
#[instrument(skip(state, admin, headers))]
pub async fn read(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    let result = admin
        .api(state.api())
        .mark_notification_read(&NotificationId::new(id))
        .await;
    marked(&state, &admin, &headers, result).await
}

/// Mark every notification read.
#[instrument(skip(state, admin, headers))]
pub async fn read_all(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    headers: HeaderMap,
) -> Result<Response> {
    let result = admin
        .api(state.api())
        .mark_all_notifications_read()
        .await;
    marked(&state, &admin, &headers, result).await
}
