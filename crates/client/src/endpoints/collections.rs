//! Collections.

use luxe_core::validation::ValidCollection;
use luxe_core::{Collection, CollectionId};
use reqwest::Method;
use serde_json::Value;
use tracing::instrument;

use crate::client::{API_V1, Api, Query, segment};
use crate::{Ack, ApiError, Envelope, Page};

/// Filters for `GET /collections`.
#[derive(Debug, Clone, Default)]
pub struct CollectionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl Api<'_> {
    /// # Errors
    ///
    /// Returns error if the request fails or the list has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn list_collections(
        &self,
        query: &CollectionQuery,
    ) -> Result<Envelope<Page<Collection>>, ApiError> {
        let endpoint = Query::default()
            .number("page", query.page)
            .number("limit", query.limit)
            .text("search", query.search.as_deref())
            .flag("isActive", query.is_active)
            .build(&format!("{API_V1}/collections"));
        self.request(Method::GET, &endpoint, None)
            .await?
            .map(|data| Page::from_data(data, "collections", &[]))
    }

    /// # Errors
    ///
    /// Returns error if the request fails or the collection cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get_collection(&self, id: &CollectionId) -> Result<Envelope<Collection>, ApiError> {
        self.request(
            Method::GET,
            &format!("{API_V1}/collections/{}", segment(id.as_str())),
            None,
        )
        .await?
        .map(|data| match data {
            Value::Object(mut map) if map.get("collection").is_some_and(Value::is_object) => {
                serde_json::from_value(map.remove("collection").unwrap_or_default())
            }
            other => serde_json::from_value(other),
        })
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, collection), fields(name = %collection.name))]
    pub async fn create_collection(&self, collection: &ValidCollection) -> Result<Ack, ApiError> {
        self.request(
            Method::POST,
            &format!("{API_V1}/collections"),
            Some(serde_json::to_value(collection)?),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, collection))]
    pub async fn update_collection(
        &self,
        id: &CollectionId,
        collection: &ValidCollection,
    ) -> Result<Ack, ApiError> {
        self.request(
            Method::PATCH,
            &format!("{API_V1}/collections/{}", segment(id.as_str())),
            Some(serde_json::to_value(collection)?),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_collection(&self, id: &CollectionId) -> Result<Ack, ApiError> {
        self.request(
            Method::DELETE,
            &format!("{API_V1}/collections/{}", segment(id.as_str())),
            None,
        )
        .await
    }
}
