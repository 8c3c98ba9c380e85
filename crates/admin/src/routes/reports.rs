//! Reports page: user statistics.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;
use luxe_client::UserQuery;
use luxe_core::UserRecord;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminSession, RequireAdmin};
use crate::models::reports::REPORT_USER_LIMIT;
use crate::models::{Flash, PageContext, ReportCard, UserStats};
use crate::routes::into_page;
use crate::routes::users::UserRow;
use crate::state::AppState;

/// Seconds between report card refreshes.
pub const REPORT_REFRESH_SECS: u64 = 30;

/// Newest users listed under the cards.
const RECENT_USERS: usize = 5;

const REPORTS_FAILED: &str = "خطا در دریافت داده‌ها";

/// Reports page template.
#[derive(Template, WebTemplate)]
#[template(path = "reports.html")]
pub struct ReportsTemplate {
    pub page: PageContext,
    pub cards: Vec<ReportCard>,
    pub recent: Vec<UserRow>,
    pub refresh_secs: u64,
}

/// Report cards fragment, refreshed by htmx.
#[derive(Template, WebTemplate)]
#[template(path = "partials/report_cards.html")]
pub struct ReportCardsTemplate {
    pub cards: Vec<ReportCard>,
    pub refresh_secs: u64,
}

struct Snapshot {
    stats: UserStats,
    users: Vec<UserRecord>,
}

/// Fetch users and bans together. Either failing fails the snapshot.
async fn snapshot(state: &AppState, admin: &AdminSession) -> std::result::Result<Snapshot, luxe_client::ApiError> {
    let api = admin.api(state.api());
    let query = UserQuery {
        limit: Some(REPORT_USER_LIMIT),
        ..Default::default()
    };
    let (users, bans) = tokio::join!(
        api.list_users(&query),
        api.banned_users(Some(1), Some(REPORT_USER_LIMIT))
    );
    let users = into_page(users)?.items;
    let bans = into_page(bans)?;
    let banned = bans
        .pagination
        .total
        .and_then(|t| usize::try_from(t).ok())
        .unwrap_or(bans.items.len());

    Ok(Snapshot {
        stats: UserStats::compute(&users, banned, Utc::now()),
        users,
    })
}

/// Most recently created users first; users without a date go last.
fn recent_users(mut users: Vec<UserRecord>) -> Vec<UserRow> {
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    users.iter().take(RECENT_USERS).map(UserRow::from).collect()
}

/// Display the reports page.
#[instrument(skip(state, admin))]
pub async fn page(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<ReportsTemplate> {
    let mut page = PageContext::load(&admin).await?;

    let (cards, recent) = match snapshot(&state, &admin).await {
        Ok(snapshot) => (snapshot.stats.cards(), recent_users(snapshot.users)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch report data");
            page.push(Flash::error(e.user_message_or(REPORTS_FAILED)));
            (UserStats::default().cards(), Vec::new())
        }
    };

    Ok(ReportsTemplate {
        page,
        cards,
        recent,
        refresh_secs: REPORT_REFRESH_SECS,
    })
}

/// Render the cards alone.
#[instrument(skip(state, admin))]
pub async fn cards(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> ReportCardsTemplate {
    let stats = match snapshot(&state, &admin).await {
        Ok(snapshot) => snapshot.stats,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to refresh report cards");
            UserStats::default()
        }
    };
    ReportCardsTemplate {
        cards: stats.cards(),
        refresh_secs: REPORT_REFRESH_SECS,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_recent_users_newest_first() {
        let users: Vec<UserRecord> = serde_json::from_value(json!([
            {"_id": "a", "phone": "09120000001", "createdAt": "2026-01-01T00:00:00Z"},
            {"_id": "b", "phone": "09120000002"},
            {"_id": "c", "phone": "09120000003", "createdAt": "2026-03-01T00:00:00Z"}
        ]))
        .unwrap();
        let ids: Vec<String> = recent_users(users).into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
