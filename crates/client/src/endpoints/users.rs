//! User administration and the caller's own profile.

use luxe_core::{Ban, UserId, UserRecord};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::auth::ProfileData;
use crate::client::{API_V1, Api, Query, segment};
use crate::{Ack, ApiError, Envelope, Page};

/// Filters for `GET /users`.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

/// Body of `PATCH /users/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
}

impl Api<'_> {
    /// # Errors
    ///
    /// Returns error if the request fails or the list has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn list_users(&self, query: &UserQuery) -> Result<Envelope<Page<UserRecord>>, ApiError> {
        let endpoint = Query::default()
            .number("page", query.page)
            .number("limit", query.limit)
            .text("search", query.search.as_deref())
            .build(&format!("{API_V1}/users"));
        self.request(Method::GET, &endpoint, None)
            .await?
            .map(|data| Page::from_data(data, "users", &[]))
    }

    /// Banned phones, under `data.bans` or `data.bannedUsers`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the list has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn banned_users(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Envelope<Page<Ban>>, ApiError> {
        let endpoint = Query::default()
            .number("page", page)
            .number("limit", limit)
            .build(&format!("{API_V1}/users/banned"));
        self.request(Method::GET, &endpoint, None)
            .await?
            .map(|data| Page::from_data(data, "bans", &["bannedUsers"]))
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn ban_user(&self, id: &UserId) -> Result<Ack, ApiError> {
        self.request(
            Method::POST,
            &format!("{API_V1}/users/ban/{}", segment(id.as_str())),
            None,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn unban_user(&self, id: &UserId) -> Result<Ack, ApiError> {
        self.request(
            Method::POST,
            &format!("{API_V1}/users/unban/{}", segment(id.as_str())),
            None,
        )
        .await
    }

    /// Update the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response has an unexpected shape.
    #[instrument(skip(self, update))]
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<Envelope<ProfileData>, ApiError> {
        self.request(
            Method::PATCH,
            &format!("{API_V1}/users/me"),
            Some(serde_json::to_value(update)?),
        )
        .await?
        .decode()
    }
}
