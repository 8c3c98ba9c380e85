//! Dashboard entry point: one page, four tabs.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::routes::{collections, comments, products, users};
use crate::state::AppState;

/// Query string of `GET /`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardQuery {
    pub tab: Option<String>,
    pub page: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    /// Id of the product or collection being edited.
    pub edit: Option<String>,
}

/// Dashboard tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Users,
    Products,
    Collections,
    Comments,
}

impl Tab {
    pub const ALL: [Self; 4] = [Self::Users, Self::Products, Self::Collections, Self::Comments];

    /// Unknown or missing keys open the users tab.
    #[must_use]
    pub fn parse(key: Option<&str>) -> Self {
        match key {
            Some("products") => Self::Products,
            Some("collections") => Self::Collections,
            Some("comments") => Self::Comments,
            _ => Self::Users,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Collections => "collections",
            Self::Comments => "comments",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "کاربران",
            Self::Products => "محصولات",
            Self::Collections => "مجموعه‌ها",
            Self::Comments => "نظرات",
        }
    }

    #[must_use]
    pub fn href(self) -> String {
        format!("/?tab={}", self.key())
    }
}

/// A tab in the dashboard navigation.
#[derive(Debug, Clone)]
pub struct TabLink {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Navigation with `current` highlighted.
#[must_use]
pub fn tab_links(current: Tab) -> Vec<TabLink> {
    Tab::ALL
        .iter()
        .map(|&tab| TabLink {
            label: tab.label(),
            href: tab.href(),
            active: tab == current,
        })
        .collect()
}

/// Previous/next links for a paged list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationView {
    pub label: String,
    pub prev_href: String,
    pub next_href: String,
    pub has_prev: bool,
    pub has_next: bool,
}

impl PaginationView {
    /// `params` are repeated on every link; `page` is appended.
    #[must_use]
    pub fn new(page: u32, page_count: u32, params: &[(&str, &str)]) -> Self {
        let page_count = page_count.max(1);
        let page = page.clamp(1, page_count);
        let href = |target: u32| {
            let mut query = form_urlencoded::Serializer::new(String::new());
            for (key, value) in params {
                if !value.is_empty() {
                    query.append_pair(key, value);
                }
            }
            query.append_pair("page", &target.to_string());
            format!("/?{}", query.finish())
        };

        Self {
            label: luxe_core::types::price::persian_digits(&format!(
                "صفحه {page} از {page_count}"
            )),
            prev_href: href(page.saturating_sub(1).max(1)),
            next_href: href((page + 1).min(page_count)),
            has_prev: page > 1,
            has_next: page < page_count,
        }
    }
}

/// Render the requested tab.
#[instrument(skip(state, admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<DashboardQuery>,
) -> Result<Response> {
    let response = match Tab::parse(query.tab.as_deref()) {
        Tab::Users => users::tab(&state, &admin, &query).await?.into_response(),
        Tab::Products => products::tab(&state, &admin, &query).await?.into_response(),
        Tab::Collections => collections::tab(&state, &admin, &query).await?.into_response(),
        Tab::Comments => comments::tab(&state, &admin).await?.into_response(),
    };
    Ok(response)
}
