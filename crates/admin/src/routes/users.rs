//! Users tab and ban management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use futures::future::join_all;
use luxe_client::{Api, UserQuery};
use luxe_core::types::price::persian_digits;
use luxe_core::{Ban, UserId, UserRecord};
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminSession, RequireAdmin};
use crate::models::bans::{BAN_LOOKUP_LIMIT, display_date};
use crate::models::{BanRow, Flash, PageContext, match_user};
use crate::routes::dashboard::{DashboardQuery, PaginationView, Tab, TabLink, tab_links};
use crate::routes::{into_page, return_path};
use crate::state::AppState;

/// Users shown per page.
pub const USERS_PER_PAGE: u32 = 10;

/// Toast after a ban.
pub const USER_BANNED: &str = "کاربر با موفقیت بن شد";
/// Toast after an unban.
pub const USER_UNBANNED: &str = "بن کاربر با موفقیت رفع شد";

const BAN_FAILED: &str = "خطا در بن کردن کاربر";
const UNBAN_FAILED: &str = "خطا در رفع بن کاربر";
const USERS_FAILED: &str = "خطا در دریافت لیست کاربران";
const BANS_FAILED: &str = "خطا در دریافت لیست کاربران بن شده";

/// Filter applied to the current page of users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Active,
    Banned,
}

impl StatusFilter {
    const ALL: [Self; 3] = [Self::All, Self::Active, Self::Banned];

    #[must_use]
    pub fn parse(key: Option<&str>) -> Self {
        match key {
            Some("active") => Self::Active,
            Some("banned") => Self::Banned,
            _ => Self::All,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Banned => "banned",
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::All => "همه",
            Self::Active => "فعال",
            Self::Banned => "بن شده",
        }
    }

    #[must_use]
    pub const fn matches(self, user: &UserRecord) -> bool {
        match self {
            Self::All => true,
            Self::Active => !user.banned,
            Self::Banned => user.banned,
        }
    }
}

/// An option of a `<select>`.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// A row of the users table.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub is_admin: bool,
    pub banned: bool,
    pub joined: String,
}

impl From<&UserRecord> for UserRow {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.display_name(),
            phone: persian_digits(&user.phone),
            email: user.email.clone().unwrap_or_default(),
            is_admin: user.is_admin(),
            banned: user.banned,
            joined: display_date(user.created_at),
        }
    }
}

/// Users tab template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/users.html")]
pub struct UsersTabTemplate {
    pub page: PageContext,
    pub tabs: Vec<TabLink>,
    pub users: Vec<UserRow>,
    pub bans: Vec<BanRow>,
    pub search: String,
    pub status_options: Vec<FilterOption>,
    pub total: String,
    pub pagination: PaginationView,
    /// Where ban/unban forms come back to.
    pub return_to: String,
}

/// Ban/unban form data.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BanForm {
    pub return_to: Option<String>,
}

/// Attach the account behind each ban, searching by phone when the backend
/// did not populate it. Lookups run concurrently; a failed lookup leaves the
/// row without an account.
async fn enrich_bans(api: Api<'_>, bans: &[Ban]) -> Vec<BanRow> {
    let lookups = bans.iter().map(|ban| async move {
        if let Some(user) = ban.user.as_ref() {
            return BanRow::new(ban, Some(user));
        }
        if ban.phone.is_empty() {
            return BanRow::new(ban, None);
        }
        let query = UserQuery {
            search: Some(ban.phone.clone()),
            limit: Some(BAN_LOOKUP_LIMIT),
            ..Default::default()
        };
        match into_page(api.list_users(&query).await) {
            Ok(found) => BanRow::new(ban, match_user(&ban.phone, &found.items)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to look up banned user");
                BanRow::new(ban, None)
            }
        }
    });
    join_all(lookups).await
}

/// Build the users tab.
pub(crate) async fn tab(
    state: &AppState,
    admin: &AdminSession,
    query: &DashboardQuery,
) -> Result<UsersTabTemplate> {
    let mut page = PageContext::load(admin).await?;
    let api = admin.api(state.api());

    let search = query.search.clone().unwrap_or_default().trim().to_owned();
    let status = StatusFilter::parse(query.status.as_deref());
    let current = query.page.unwrap_or(1).max(1);

    let user_query = UserQuery {
        page: Some(current),
        limit: Some(USERS_PER_PAGE),
        search: (!search.is_empty()).then(|| search.clone()),
    };
    let (users_result, bans_result) =
        tokio::join!(api.list_users(&user_query), api.banned_users(None, None));

    let (users, total, page_count) = match into_page(users_result) {
        Ok(list) => {
            let total = list
                .pagination
                .total
                .unwrap_or(list.items.len() as u64);
            let page_count = list.pagination.page_count(USERS_PER_PAGE);
            let rows = list
                .items
                .iter()
                .filter(|u| status.matches(u))
                .map(UserRow::from)
                .collect();
            (rows, total, page_count)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch users");
            page.push(Flash::error(e.user_message_or(USERS_FAILED)));
            (Vec::new(), 0, 1)
        }
    };

    let bans = match into_page(bans_result) {
        Ok(list) => enrich_bans(api, &list.items).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch banned users");
            page.push(Flash::error(e.user_message_or(BANS_FAILED)));
            Vec::new()
        }
    };

    let params = [
        ("tab", Tab::Users.key()),
        ("search", search.as_str()),
        ("status", status.key()),
    ];
    let pagination = PaginationView::new(current, page_count, &params);
    let return_to = format!("/?tab=users&page={current}");

    Ok(UsersTabTemplate {
        page,
        tabs: tab_links(Tab::Users),
        users,
        bans,
        status_options: StatusFilter::ALL
            .iter()
            .map(|&s| FilterOption {
                value: s.key(),
                label: s.label(),
                selected: s == status,
            })
            .collect(),
        search,
        total: persian_digits(&total.to_string()),
        pagination,
        return_to,
    })
}

/// Ban a user.
#[instrument(skip(state, admin, form))]
pub async fn ban(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<BanForm>,
) -> Result<Redirect> {
    let id = UserId::new(id);
    let result = admin
        .api(state.api())
        .ban_user(&id)
        .await
        .and_then(luxe_client::Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!(user_id = %id, "User banned");
            admin.flash(Flash::success(USER_BANNED)).await?;
        }
        Err(e) => {
            tracing::warn!(user_id = %id, error = %e, "Failed to ban user");
            admin.flash(Flash::error(e.user_message_or(BAN_FAILED))).await?;
        }
    }
    Ok(Redirect::to(&return_path(form.return_to.as_deref(), "/?tab=users")))
}

/// Lift a ban.
#[instrument(skip(state, admin, form))]
pub async fn unban(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<BanForm>,
) -> Result<Redirect> {
    let id = UserId::new(id);
    let result = admin
        .api(state.api())
        .unban_user(&id)
        .await
        .and_then(luxe_client::Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!(user_id = %id, "User unbanned");
            admin.flash(Flash::success(USER_UNBANNED)).await?;
        }
        Err(e) => {
            tracing::warn!(user_id = %id, error = %e, "Failed to unban user");
            admin
                .flash(Flash::error(e.user_message_or(UNBAN_FAILED)))
                .await?;
        }
    }
    Ok(Redirect::to(&return_path(form.return_to.as_deref(), "/?tab=users")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter() {
        let banned = UserRecord {
            banned: true,
            ..Default::default()
        };
        assert!(StatusFilter::parse(Some("banned")).matches(&banned));
        assert!(!StatusFilter::parse(Some("active")).matches(&banned));
        assert!(StatusFilter::parse(Some("bogus")).matches(&banned));
    }
}
