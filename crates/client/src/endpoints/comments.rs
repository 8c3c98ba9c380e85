//! Product comments, replies and their moderation.

use luxe_core::{Comment, CommentId, CommentStatus, ProductId, RatingSummary, ReplyId};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::client::{API_V1, Api, Query, segment};
use crate::{Ack, ApiError, Envelope, Page};

/// Body of `POST /comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub product_id: ProductId,
    pub content: String,
    pub rating: u8,
}

impl Api<'_> {
    /// All comments, for moderation.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the list has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Envelope<Page<Comment>>, ApiError> {
        let endpoint = Query::default()
            .number("page", page)
            .number("limit", limit)
            .build(&format!("{API_V1}/comments"));
        self.request(Method::GET, &endpoint, None)
            .await?
            .map(|data| Page::from_data(data, "comments", &[]))
    }

    /// Comments on one product, as the backend chooses to expose them.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the list has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn product_comments(
        &self,
        product: &ProductId,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Envelope<Page<Comment>>, ApiError> {
        let endpoint = Query::default()
            .number("page", page)
            .number("limit", limit)
            .build(&format!(
                "{API_V1}/comments/product/{}",
                segment(product.as_str())
            ));
        self.request(Method::GET, &endpoint, None)
            .await?
            .map(|data| Page::from_data(data, "comments", &[]))
    }

    /// Rating summary of a product (`data.summary`), cached briefly.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend reports failure.
    #[instrument(skip(self))]
    pub async fn comment_summary(&self, product: &ProductId) -> Result<RatingSummary, ApiError> {
        let cache = self.client().summaries();
        if let Some(summary) = cache.get(product).await {
            return Ok(summary);
        }

        let envelope = self
            .request(
                Method::GET,
                &format!(
                    "{API_V1}/comments/product/{}/summary",
                    segment(product.as_str())
                ),
                None,
            )
            .await?
            .ensure_success()?;

        let summary = match envelope.data.and_then(|mut d| d.get_mut("summary").map(Value::take)) {
            Some(value) if !value.is_null() => serde_json::from_value(value)?,
            _ => RatingSummary::default(),
        };
        cache.insert(product.clone(), summary).await;
        Ok(summary)
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, comment), fields(product_id = %comment.product_id))]
    pub async fn create_comment(&self, comment: &NewComment) -> Result<Ack, ApiError> {
        let ack = self
            .request(
                Method::POST,
                &format!("{API_V1}/comments"),
                Some(serde_json::to_value(comment)?),
            )
            .await?;
        self.client().summaries().invalidate(&comment.product_id).await;
        Ok(ack)
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn update_comment_status(
        &self,
        id: &CommentId,
        status: CommentStatus,
    ) -> Result<Ack, ApiError> {
        self.request(
            Method::PATCH,
            &format!("{API_V1}/comments/{}/status", segment(id.as_str())),
            Some(json!({ "status": status })),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, id: &CommentId) -> Result<Ack, ApiError> {
        self.request(
            Method::DELETE,
            &format!("{API_V1}/comments/{}", segment(id.as_str())),
            None,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn update_reply_status(
        &self,
        comment: &CommentId,
        reply: &ReplyId,
        status: CommentStatus,
    ) -> Result<Ack, ApiError> {
        self.request(
            Method::PATCH,
            &format!(
                "{API_V1}/comments/{}/replies/{}/status",
                segment(comment.as_str()),
                segment(reply.as_str())
            ),
            Some(json!({ "status": status })),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_reply(&self, comment: &CommentId, reply: &ReplyId) -> Result<Ack, ApiError> {
        self.request(
            Method::DELETE,
            &format!(
                "{API_V1}/comments/{}/replies/{}",
                segment(comment.as_str()),
                segment(reply.as_str())
            ),
            None,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, content))]
    pub async fn create_reply(&self, comment: &CommentId, content: &str) -> Result<Ack, ApiError> {
        self.request(
            Method::POST,
            &format!("{API_V1}/comments/{}/reply", segment(comment.as_str())),
            Some(json!({ "content": content })),
        )
        .await
    }
}
