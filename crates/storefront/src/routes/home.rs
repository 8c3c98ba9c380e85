//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use luxe_client::{CollectionQuery, ProductQuery};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::Visitor;
use crate::models::PageContext;
use crate::routes::collections::CollectionCard;
use crate::routes::into_page;
use crate::routes::products::ProductCard;
use crate::state::AppState;

/// Featured products on the home page.
const FEATURED_LIMIT: u32 = 4;

/// Collections on the home page.
const COLLECTION_LIMIT: u32 = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub featured: Vec<ProductCard>,
    pub collections: Vec<CollectionCard>,
}

/// Display the home page.
///
/// Featured products and collections are fetched concurrently; either list
/// failing leaves its section empty.
#[instrument(skip(state, visitor))]
pub async fn home(State(state): State<AppState>, visitor: Visitor) -> Result<impl IntoResponse> {
    let page = PageContext::load(&visitor).await?;
    let api = state.api().anonymous();

    let product_query = ProductQuery {
        featured: Some(true),
        limit: Some(FEATURED_LIMIT),
        ..Default::default()
    };
    let collection_query = CollectionQuery {
        limit: Some(COLLECTION_LIMIT),
        ..Default::default()
    };
    let (products, collections) = tokio::join!(
        api.list_products(&product_query),
        api.list_collections(&collection_query),
    );

    let featured = match into_page(products) {
        Ok(list) => list
            .items
            .iter()
            .map(|p| ProductCard::new(p, state.api(), None))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch featured products");
            Vec::new()
        }
    };

    let collections = match into_page(collections) {
        Ok(list) => list
            .items
            .iter()
            .map(|c| CollectionCard::new(c, state.api()))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch collections");
            Vec::new()
        }
    };

    Ok(HomeTemplate {
        page,
        featured,
        collections,
    })
}
