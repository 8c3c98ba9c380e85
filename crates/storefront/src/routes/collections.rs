//! Collection route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use luxe_client::{ApiClient, CollectionQuery, ProductQuery};
use luxe_core::catalog::LIST_FETCH_LIMIT;
use luxe_core::{Collection, Product};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::Visitor;
use crate::models::{Flash, PageContext};
use crate::routes::into_page;
use crate::routes::products::ProductCard;
use crate::state::AppState;

/// Category listed on the lighting page.
pub const LIGHTING_CATEGORY: &str = "روشنایی";

/// Products shown on the lighting and newest pages.
const SHOWCASE_LIMIT: u32 = 12;

const COLLECTIONS_FAILED: &str = "خطا در دریافت مجموعه‌ها";
const COLLECTION_MISSING: &str = "مجموعه یافت نشد";

/// Collection card for lists.
#[derive(Debug, Clone)]
pub struct CollectionCard {
    /// Slug when the collection has one, else its id.
    pub key: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub section_count: usize,
}

impl CollectionCard {
    #[must_use]
    pub fn new(collection: &Collection, api: &ApiClient) -> Self {
        let key = if collection.slug.is_empty() {
            collection.id.to_string()
        } else {
            collection.slug.clone()
        };
        Self {
            key,
            name: collection.name.clone(),
            description: collection.description.clone(),
            image: api.image_url(collection.image.as_deref()),
            section_count: collection.active_sections().len(),
        }
    }
}

/// One section of a collection with its products.
#[derive(Debug, Clone)]
pub struct SectionView {
    pub name: String,
    pub description: String,
    pub products: Vec<ProductCard>,
}

/// Group `products` under the collection's active sections, in section order.
#[must_use]
pub fn group_by_section(
    collection: &Collection,
    products: &[Product],
    api: &ApiClient,
) -> Vec<SectionView> {
    collection
        .active_sections()
        .into_iter()
        .map(|section| SectionView {
            name: section.name.clone(),
            description: section.description.clone(),
            products: products
                .iter()
                .filter(|p| p.section == section.name)
                .map(|p| ProductCard::new(p, api, None))
                .collect(),
        })
        .collect()
}

/// Collection list template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/index.html")]
pub struct CollectionsIndexTemplate {
    pub page: PageContext,
    pub collections: Vec<CollectionCard>,
}

/// Collection detail template.
#[derive(Template, WebTemplate)]
#[template(path = "collections/show.html")]
pub struct CollectionShowTemplate {
    pub page: PageContext,
    pub name: String,
    pub description: String,
    pub image: String,
    pub sections: Vec<SectionView>,
    /// Products listed flat when the collection has no sections.
    pub products: Vec<ProductCard>,
    pub has_sections: bool,
}

/// Shown when no collection matches the slug.
#[derive(Template, WebTemplate)]
#[template(path = "collections/missing.html")]
pub struct CollectionMissingTemplate {
    pub page: PageContext,
    pub message: String,
}

/// Simple product showcase (lighting, newest).
#[derive(Template, WebTemplate)]
#[template(path = "collections/showcase.html")]
pub struct ShowcaseTemplate {
    pub page: PageContext,
    pub title: String,
    pub subtitle: String,
    pub products: Vec<ProductCard>,
}

/// Display all collections.
#[instrument(skip(state, visitor))]
pub async fn index(State(state): State<AppState>, visitor: Visitor) -> Result<impl IntoResponse> {
    let mut page = PageContext::load(&visitor).await?;

    let query = CollectionQuery {
        limit: Some(LIST_FETCH_LIMIT),
        ..Default::default()
    };
    let collections = match into_page(state.api().anonymous().list_collections(&query).await) {
        Ok(list) => list
            .items
            .iter()
            .map(|c| CollectionCard::new(c, state.api()))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch collections");
            page.push(Flash::error(e.user_message_or(COLLECTIONS_FAILED)));
            Vec::new()
        }
    };

    Ok(CollectionsIndexTemplate { page, collections })
}

/// Display a collection found by slug or id, grouped by section.
#[instrument(skip(state, visitor))]
pub async fn show(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(slug): Path<String>,
) -> Result<Response> {
    let mut page = PageContext::load(&visitor).await?;
    let api = state.api().anonymous();

    let query = CollectionQuery {
        limit: Some(LIST_FETCH_LIMIT),
        ..Default::default()
    };
    let collection = match into_page(api.list_collections(&query).await) {
        Ok(list) => list.items.into_iter().find(|c| c.matches_key(&slug)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch collections");
            page.push(Flash::error(e.user_message_or(COLLECTIONS_FAILED)));
            None
        }
    };

    let Some(collection) = collection else {
        let missing = CollectionMissingTemplate {
            page,
            message: COLLECTION_MISSING.to_owned(),
        };
        return Ok((StatusCode::NOT_FOUND, missing).into_response());
    };

    let product_query = ProductQuery {
        collection_id: Some(collection.id.to_string()),
        limit: Some(LIST_FETCH_LIMIT),
        ..Default::default()
    };
    let products = into_page(api.list_products(&product_query).await)
        .map(|list| list.items)
        .unwrap_or_else(|e| {
            tracing::warn!(collection_id = %collection.id, error = %e, "Failed to fetch collection products");
            Vec::new()
        });

    let sections = group_by_section(&collection, &products, state.api());
    let has_sections = !sections.is_empty();
    let flat = if has_sections {
        Vec::new()
    } else {
        products
            .iter()
            .map(|p| ProductCard::new(p, state.api(), None))
            .collect()
    };

    Ok(CollectionShowTemplate {
        page,
        image: state.api().image_url(collection.image.as_deref()),
        name: collection.name,
        description: collection.description,
        sections,
        products: flat,
        has_sections,
    }
    .into_response())
}

async fn showcase(
    state: &AppState,
    visitor: &Visitor,
    query: ProductQuery,
    title: &str,
    subtitle: &str,
) -> Result<ShowcaseTemplate> {
    let mut page = PageContext::load(visitor).await?;

    let products = match into_page(state.api().anonymous().list_products(&query).await) {
        Ok(list) => list
            .items
            .iter()
            .map(|p| ProductCard::new(p, state.api(), None))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch showcase products");
            page.push(Flash::error(e.user_message_or("خطا در دریافت محصولات")));
            Vec::new()
        }
    };

    Ok(ShowcaseTemplate {
        page,
        title: title.to_owned(),
        subtitle: subtitle.to_owned(),
        products,
    })
}

/// Display lighting products.
#[instrument(skip(state, visitor))]
pub async fn lighting(
    State(state): State<AppState>,
    visitor: Visitor,
) -> Result<ShowcaseTemplate> {
    let query = ProductQuery {
        category: Some(LIGHTING_CATEGORY.to_owned()),
        limit: Some(SHOWCASE_LIMIT),
        ..Default::default()
    };
    showcase(&state, &visitor, query, "روشنایی", "لوسترها، آباژورها و چراغ‌های دیواری").await
}

/// Display the newest products.
#[instrument(skip(state, visitor))]
pub async fn newest(State(state): State<AppState>, visitor: Visitor) -> Result<ShowcaseTemplate> {
    let query = ProductQuery {
        limit: Some(SHOWCASE_LIMIT),
        ..Default::default()
    };
    showcase(&state, &visitor, query, "جدیدترین‌ها", "تازه‌ترین محصولات فروشگاه").await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luxe_client::ApiConfig;
    use serde_json::json;

    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&ApiConfig::new("https://api.example.com")).unwrap()
    }

    fn collection() -> Collection {
        serde_json::from_value(json!({
            "_id": "c1",
            "name": "کلاسیک",
            "slug": "classic",
            "sections": [
                {"name": "پذیرایی", "sortOrder": 2},
                {"name": "خواب", "sortOrder": 1},
                {"name": "آرشیو", "isActive": false}
            ]
        }))
        .unwrap()
    }

    fn product(id: &str, section: &str) -> Product {
        serde_json::from_value(json!({
            "_id": id,
            "name": id,
            "price": 1000,
            "section": section
        }))
        .unwrap()
    }

    #[test]
    fn test_group_by_section() {
        let products = vec![
            product("sofa", "پذیرایی"),
            product("bed", "خواب"),
            product("lamp", "پذیرایی"),
            product("old", "آرشیو"),
        ];
        let sections = group_by_section(&collection(), &products, &client());

        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["خواب", "پذیرایی"]);
        assert_eq!(sections[1].products.len(), 2);
    }

    #[test]
    fn test_card_prefers_slug() {
        let card = CollectionCard::new(&collection(), &client());
        assert_eq!(card.key, "classic");
        assert_eq!(card.section_count, 2);
        assert_eq!(card.image, luxe_client::images::PLACEHOLDER_IMAGE);
    }
}
