//! Admin notifications.

use luxe_core::{Notification, NotificationId};
use reqwest::Method;
use tracing::instrument;

use crate::client::{API_V1, Api, Query, segment};
use crate::{Ack, ApiError, Envelope, Page};

impl Api<'_> {
    /// # Errors
    ///
    /// Returns error if the request fails or the list has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn list_notifications(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Envelope<Page<Notification>>, ApiError> {
        let endpoint = Query::default()
            .number("page", page)
            .number("limit", limit)
            .build(&format!("{API_V1}/notifications"));
        self.request(Method::GET, &endpoint, None)
            .await?
            .map(|data| Page::from_data(data, "notifications", &[]))
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn mark_notification_read(&self, id: &NotificationId) -> Result<Ack, ApiError> {
        self.request(
            Method::PATCH,
            &format!("{API_V1}/notifications/{}/read", segment(id.as_str())),
            None,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn mark_all_notifications_read(&self) -> Result<Ack, ApiError> {
        self.request(
            Method::PATCH,
            &format!("{API_V1}/notifications/read-all"),
            None,
        )
        .await
    }
}
