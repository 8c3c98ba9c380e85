//! Product catalog.

use std::collections::HashMap;

use futures::future::join_all;
use luxe_core::validation::ValidProduct;
use luxe_core::{Product, ProductId, RatingSummary};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::instrument;

use crate::client::{API_V1, Api, Query, segment};
use crate::{Ack, ApiError, Envelope, Page};

/// Filters for `GET /products`.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
    /// Also accepted by the backend as `collection`.
    pub collection_id: Option<String>,
}

impl ProductQuery {
    fn endpoint(&self) -> String {
        Query::default()
            .number("page", self.page)
            .number("limit", self.limit)
            .text("search", self.search.as_deref())
            .text("category", self.category.as_deref())
            .flag("isActive", self.is_active)
            .flag("featured", self.featured)
            .text("collectionId", self.collection_id.as_deref())
            .build(&format!("{API_V1}/products"))
    }
}

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Multipart body for product create/update.
#[derive(Debug, Clone)]
pub struct ProductUpload {
    pub fields: ValidProduct,
    pub images: Vec<ImageUpload>,
}

impl ProductUpload {
    fn into_form(self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for (name, value) in self.fields.form_fields() {
            form = form.text(name, value);
        }
        for image in self.images {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            form = form.part("images", part);
        }
        Ok(form)
    }
}

impl Api<'_> {
    /// List products. Accepts `data.products`, `data` as an array, or a bare
    /// array body.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the list has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Envelope<Page<Product>>, ApiError> {
        self.request(Method::GET, &query.endpoint(), None)
            .await?
            .map(|data| Page::from_data(data, "products", &[]))
    }

    /// Fetch one product by id.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the product cannot be parsed.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Envelope<Product>, ApiError> {
        self.request(
            Method::GET,
            &format!("{API_V1}/products/{}", segment(id.as_str())),
            None,
        )
        .await?
        .map(|data| match data {
            Value::Object(mut map) if map.get("product").is_some_and(Value::is_object) => {
                serde_json::from_value(map.remove("product").unwrap_or_default())
            }
            other => serde_json::from_value(other),
        })
    }

    /// Create a product with its images (multipart).
    ///
    /// # Errors
    ///
    /// Returns error if the form cannot be built or the request fails.
    #[instrument(skip(self, upload), fields(name = %upload.fields.name, images = upload.images.len()))]
    pub async fn create_product(&self, upload: ProductUpload) -> Result<Ack, ApiError> {
        let form = upload.into_form()?;
        self.send_multipart(Method::POST, &format!("{API_V1}/products"), form)
            .await
    }

    /// Update a product (multipart); new images are appended.
    ///
    /// # Errors
    ///
    /// Returns error if the form cannot be built or the request fails.
    #[instrument(skip(self, upload))]
    pub async fn update_product(&self, id: &ProductId, upload: ProductUpload) -> Result<Ack, ApiError> {
        let form = upload.into_form()?;
        self.send_multipart(
            Method::PATCH,
            &format!("{API_V1}/products/{}", segment(id.as_str())),
            form,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Ack, ApiError> {
        self.request(
            Method::DELETE,
            &format!("{API_V1}/products/{}", segment(id.as_str())),
            None,
        )
        .await
    }

    /// Rating summaries for a list of products.
    ///
    /// An embedded `ratingSummary` wins. The rest are fetched concurrently;
    /// a failed fetch yields an empty summary.
    pub async fn ratings_for(&self, products: &[Product]) -> HashMap<ProductId, RatingSummary> {
        let mut ratings: HashMap<ProductId, RatingSummary> = products
            .iter()
            .filter_map(|p| p.rating_summary.map(|s| (p.id.clone(), s)))
            .collect();

        let missing = products.iter().filter(|p| p.rating_summary.is_none());
        let fetched = join_all(missing.map(|product| async move {
            let summary = match self.comment_summary(&product.id).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::debug!(product_id = %product.id, error = %e, "Rating summary unavailable");
                    RatingSummary::default()
                }
            };
            (product.id.clone(), summary)
        }))
        .await;

        ratings.extend(fetched);
        ratings
    }
}
