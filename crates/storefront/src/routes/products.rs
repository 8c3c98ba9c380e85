//! Shop and product detail route handlers.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use luxe_client::{ApiClient, CollectionQuery, Envelope, NewComment, ProductQuery};
use luxe_core::catalog::{
    LIST_FETCH_LIMIT, ProductFilter, RELATED_LIMIT, SortKey, related_to, unique_categories,
};
use luxe_core::types::price::{latin_digits, persian_digits};
use luxe_core::validation::CommentDraft;
use luxe_core::{
    CollectionId, Comment, CommentId, Price, Product, ProductId, RatingSummary, Reply,
};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::Visitor;
use crate::models::{Flash, PageContext};
use crate::routes::into_page;
use crate::state::AppState;

/// Toast after a comment was accepted for moderation.
pub const COMMENT_SENT: &str = "نظر شما ثبت شد و پس از تایید ادمین نمایش داده می‌شود";
/// Toast after a reply was accepted for moderation.
pub const REPLY_SENT: &str = "پاسخ شما ثبت شد و پس از تایید ادمین نمایش داده می‌شود";

const PRODUCTS_FAILED: &str = "خطا در دریافت محصولات";
const PRODUCT_FAILED: &str = "خطا در دریافت اطلاعات محصول";
const PRODUCT_MISSING: &str = "محصول یافت نشد";
const COMMENTS_FAILED: &str = "خطا در دریافت کامنت‌ها";
const COMMENT_FAILED: &str = "خطا در ثبت نظر";
const REPLY_FAILED: &str = "خطا در ثبت پاسخ";

// =============================================================================
// View Models
// =============================================================================

/// Five-character star strip, e.g. "★★★★☆".
#[must_use]
pub fn star_strip(filled: u8) -> String {
    let filled = usize::from(filled.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Date shown under comments, in Persian digits.
fn display_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| persian_digits(&d.format("%Y/%m/%d").to_string()))
        .unwrap_or_default()
}

/// Product card shown in grids.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub category: String,
    pub in_stock: bool,
    pub stars: String,
    pub review_count: u64,
    pub has_reviews: bool,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, api: &ApiClient, rating: Option<&RatingSummary>) -> Self {
        let rating = rating.or(product.rating_summary.as_ref());
        let review_count = rating.map_or(0, |r| r.count);
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price,
            image: api.image_url(product.primary_image()),
            category: product.category.clone(),
            in_stock: product.in_stock(),
            stars: star_strip(rating.map_or(0, RatingSummary::filled_stars)),
            review_count,
            has_reviews: review_count > 0,
        }
    }

    /// Cards for a list, looking up each product's rating.
    #[must_use]
    pub fn list(
        products: &[Product],
        api: &ApiClient,
        ratings: &HashMap<ProductId, RatingSummary>,
    ) -> Vec<Self> {
        products
            .iter()
            .map(|p| Self::new(p, api, ratings.get(&p.id)))
            .collect()
    }
}

/// A checkbox or select option in the filter sidebar.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// A reply as rendered under its comment.
#[derive(Debug, Clone)]
pub struct ReplyView {
    pub author: String,
    pub content: String,
    pub date: String,
}

impl From<&Reply> for ReplyView {
    fn from(reply: &Reply) -> Self {
        Self {
            author: reply.author_name(),
            content: reply.content.clone(),
            date: display_date(reply.created_at),
        }
    }
}

/// A comment as rendered on the product page.
#[derive(Debug, Clone)]
pub struct CommentView {
    pub id: String,
    pub author: String,
    pub content: String,
    pub stars: String,
    pub date: String,
    pub replies: Vec<ReplyView>,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.to_string(),
            author: comment.author_name(),
            content: comment.content.clone(),
            stars: star_strip(comment.rating),
            date: display_date(comment.created_at),
            replies: comment.approved_replies().map(ReplyView::from).collect(),
        }
    }
}

// =============================================================================
// Shop
// =============================================================================

/// Shop query string.
///
/// Checkbox groups repeat their key (`category=a&category=b`), so the query
/// is read as raw pairs.
#[derive(Debug, Clone, Default)]
pub struct ShopQuery {
    pub search: String,
    pub min_price: String,
    pub max_price: String,
    pub categories: Vec<String>,
    pub collections: Vec<String>,
    pub section: String,
    pub sort: String,
}

impl ShopQuery {
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let value = value.trim().to_owned();
            match key.as_str() {
                "search" => query.search = value,
                "min_price" => query.min_price = value,
                "max_price" => query.max_price = value,
                "category" if !value.is_empty() => query.categories.push(value),
                "collection" if !value.is_empty() => query.collections.push(value),
                "section" => query.section = value,
                "sort" => query.sort = value,
                _ => {}
            }
        }
        query
    }

    /// The local filter this query describes; unparsable bounds keep defaults.
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        let defaults = ProductFilter::default();
        let bound = |raw: &str, fallback: Price| {
            latin_digits(raw)
                .replace(',', "")
                .parse::<i64>()
                .map_or(fallback, Price::toman)
        };

        ProductFilter {
            min_price: bound(&self.min_price, defaults.min_price),
            max_price: bound(&self.max_price, defaults.max_price),
            categories: self.categories.clone(),
            collections: self.collections.iter().map(CollectionId::new).collect(),
            section: Some(self.section.clone()).filter(|s| !s.is_empty()),
            search: Some(self.search.clone()).filter(|s| !s.is_empty()),
            sort: if self.sort.is_empty() {
                SortKey::default()
            } else {
                SortKey::parse(&self.sort)
            },
        }
    }
}

/// Shop page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/shop.html")]
pub struct ShopTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCard>,
    pub categories: Vec<FilterOption>,
    pub collections: Vec<FilterOption>,
    pub sorts: Vec<FilterOption>,
    pub search: String,
    pub min_price: String,
    pub max_price: String,
    pub total: usize,
    pub filtered: bool,
}

fn sort_options(current: SortKey) -> Vec<FilterOption> {
    [
        (SortKey::Featured, "ویژه"),
        (SortKey::Server, "جدیدترین"),
        (SortKey::PriceAsc, "ارزان‌ترین"),
        (SortKey::PriceDesc, "گران‌ترین"),
    ]
    .into_iter()
    .map(|(key, label)| FilterOption {
        value: key.as_str().to_owned(),
        label: label.to_owned(),
        selected: key == current,
    })
    .collect()
}

/// Display the shop with the query-string filters applied locally.
#[instrument(skip(state, visitor))]
pub async fn shop(
    State(state): State<AppState>,
    visitor: Visitor,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let query = ShopQuery::from_pairs(pairs);
    let filter = query.filter();
    let mut page = PageContext::load(&visitor).await?;
    let api = state.api().anonymous();

    let product_query = ProductQuery {
        limit: Some(LIST_FETCH_LIMIT),
        search: filter.search.clone(),
        ..Default::default()
    };
    let collection_query = CollectionQuery {
        is_active: Some(true),
        ..Default::default()
    };
    let (products, collections) = tokio::join!(
        api.list_products(&product_query),
        api.list_collections(&collection_query),
    );

    let products = match into_page(products) {
        Ok(list) => list.items,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch shop products");
            page.push(Flash::error(e.user_message_or(PRODUCTS_FAILED)));
            Vec::new()
        }
    };
    let collections = into_page(collections)
        .map(|list| list.items)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch shop collections");
            Vec::new()
        });

    let categories = unique_categories(&products)
        .into_iter()
        .map(|c| FilterOption {
            selected: filter.categories.contains(&c),
            label: c.clone(),
            value: c,
        })
        .collect();
    let collections = collections
        .iter()
        .map(|c| FilterOption {
            value: c.id.to_string(),
            label: c.name.clone(),
            selected: filter.collections.contains(&c.id),
        })
        .collect();

    let visible = filter.apply(products);
    let ratings = api.ratings_for(&visible).await;

    Ok(ShopTemplate {
        page,
        total: visible.len(),
        products: ProductCard::list(&visible, state.api(), &ratings),
        categories,
        collections,
        sorts: sort_options(filter.sort),
        search: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
        filtered: filter.is_active(),
    })
}

// =============================================================================
// Product Detail
// =============================================================================

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub images: Vec<String>,
    pub in_stock: bool,
    pub in_cart: bool,
    pub can_add: bool,
    pub average: String,
    pub stars: String,
    pub review_count: u64,
    pub comments: Vec<CommentView>,
    pub related: Vec<ProductCard>,
    pub signed_in: bool,
}

/// Shown when the product cannot be loaded.
#[derive(Template, WebTemplate)]
#[template(path = "products/missing.html")]
pub struct ProductMissingTemplate {
    pub page: PageContext,
    pub message: String,
}

/// Display a product with its rating, comments and related products.
#[instrument(skip(state, visitor))]
pub async fn show(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(id): Path<String>,
) -> Result<Response> {
    let mut page = PageContext::load(&visitor).await?;
    let id = ProductId::new(id);
    let api = state.api().anonymous();

    let product = match api.get_product(&id).await.and_then(Envelope::into_data) {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to fetch product");
            let (status, message) = if e.is_not_found() {
                (StatusCode::NOT_FOUND, PRODUCT_MISSING.to_owned())
            } else {
                (StatusCode::BAD_GATEWAY, e.user_message_or(PRODUCT_FAILED))
            };
            return Ok((status, ProductMissingTemplate { page, message }).into_response());
        }
    };

    let list_query = ProductQuery {
        limit: Some(LIST_FETCH_LIMIT),
        ..Default::default()
    };
    let (summary, comments, others) = tokio::join!(
        api.comment_summary(&product.id),
        api.product_comments(&product.id, None, None),
        api.list_products(&list_query),
    );

    let summary = summary.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Rating summary unavailable");
        product.rating_summary.unwrap_or_default()
    });
    let comments = match into_page(comments) {
        Ok(list) => list.items.iter().map(CommentView::from).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch comments");
            page.push(Flash::error(e.user_message_or(COMMENTS_FAILED)));
            Vec::new()
        }
    };
    let others = into_page(others).map(|l| l.items).unwrap_or_default();
    let related: Vec<Product> = related_to(&others, &product, RELATED_LIMIT)
        .into_iter()
        .cloned()
        .collect();
    let ratings = api.ratings_for(&related).await;

    let in_cart = visitor.store.contains(&product.id);
    let mut images: Vec<String> = product
        .images
        .iter()
        .filter(|i| !i.trim().is_empty())
        .map(|i| state.api().image_url(Some(i)))
        .collect();
    if images.is_empty() {
        images.push(state.api().image_url(product.primary_image()));
    }

    Ok(ProductShowTemplate {
        signed_in: page.signed_in,
        page,
        id: product.id.to_string(),
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price,
        category: product.category.clone(),
        images,
        in_stock: product.in_stock(),
        in_cart,
        can_add: product.in_stock() && !in_cart,
        average: persian_digits(&summary.rounded().to_string()),
        stars: star_strip(summary.filled_stars()),
        review_count: summary.count,
        comments,
        related: ProductCard::list(&related, state.api(), &ratings),
    }
    .into_response())
}

// =============================================================================
// Comments
// =============================================================================

fn back_to_product(id: &str) -> Redirect {
    Redirect::to(&format!("/product/{}#comments", urlencode(id)))
}

fn urlencode(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

/// Post a new comment; it shows up after moderation.
#[instrument(skip(state, visitor, form))]
pub async fn create_comment(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(id): Path<String>,
    Form(form): Form<CommentDraft>,
) -> Result<Redirect> {
    let comment = match form.validate_comment(visitor.user().is_some()) {
        Ok(comment) => comment,
        Err(e) => {
            visitor.flash(Flash::error(e.to_string())).await?;
            return Ok(back_to_product(&id));
        }
    };
    if let Err(e) = visitor.throttle_submit().await? {
        visitor.flash(Flash::error(e.to_string())).await?;
        return Ok(back_to_product(&id));
    }

    let token = visitor.token();
    let request = NewComment {
        product_id: ProductId::new(id.clone()),
        content: comment.content,
        rating: comment.rating,
    };
    let result = state
        .api()
        .with_token(token.as_deref())
        .create_comment(&request)
        .await
        .and_then(|ack| ack.ensure_success());

    match result {
        Ok(_) => {
            add_breadcrumb("comment", "Comment submitted", Some(&[("product_id", id.as_str())]));
            visitor.flash(Flash::success(COMMENT_SENT)).await?;
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to create comment");
            visitor
                .flash(Flash::error(e.user_message_or(COMMENT_FAILED)))
                .await?;
        }
    }
    Ok(back_to_product(&id))
}

/// Reply to a comment; it shows up after moderation.
#[instrument(skip(state, visitor, form))]
pub async fn create_reply(
    State(state): State<AppState>,
    visitor: Visitor,
    Path((id, comment_id)): Path<(String, String)>,
    Form(form): Form<CommentDraft>,
) -> Result<Redirect> {
    let content = match form.validate_reply(visitor.user().is_some()) {
        Ok(content) => content,
        Err(e) => {
            visitor.flash(Flash::error(e.to_string())).await?;
            return Ok(back_to_product(&id));
        }
    };
    if let Err(e) = visitor.throttle_submit().await? {
        visitor.flash(Flash::error(e.to_string())).await?;
        return Ok(back_to_product(&id));
    }

    let token = visitor.token();
    let result = state
        .api()
        .with_token(token.as_deref())
        .create_reply(&CommentId::new(comment_id), &content)
        .await
        .and_then(|ack| ack.ensure_success());

    match result {
        Ok(_) => visitor.flash(Flash::success(REPLY_SENT)).await?,
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to create reply");
            visitor
                .flash(Flash::error(e.user_message_or(REPLY_FAILED)))
                .await?;
        }
    }
    Ok(back_to_product(&id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_star_strip() {
        assert_eq!(star_strip(4), "★★★★☆");
        assert_eq!(star_strip(0), "☆☆☆☆☆");
        assert_eq!(star_strip(9), "★★★★★");
    }

    #[test]
    fn test_shop_query_collects_repeated_keys() {
        let query = ShopQuery::from_pairs(pairs(&[
            ("category", "مبل"),
            ("category", "میز"),
            ("category", ""),
            ("collection", "c1"),
            ("sort", "price-desc"),
        ]));
        let filter = query.filter();

        assert_eq!(filter.categories, vec!["مبل".to_owned(), "میز".to_owned()]);
        assert_eq!(filter.collections, vec![CollectionId::new("c1")]);
        assert_eq!(filter.sort, SortKey::PriceDesc);
        assert!(filter.is_active());
    }

    #[test]
    fn test_shop_query_price_bounds() {
        let query = ShopQuery::from_pairs(pairs(&[
            ("min_price", "۱۰۰۰۰۰"),
            ("max_price", "2,000,000"),
        ]));
        let filter = query.filter();
        assert_eq!(filter.min_price, Price::toman(100_000));
        assert_eq!(filter.max_price, Price::toman(2_000_000));
    }

    #[test]
    fn test_empty_shop_query_is_default_filter() {
        let filter = ShopQuery::from_pairs(Vec::new()).filter();
        assert_eq!(filter, ProductFilter::default());
        assert!(!filter.is_active());
    }

    #[test]
    fn test_garbage_price_keeps_default() {
        let filter = ShopQuery::from_pairs(pairs(&[("max_price", "lots")])).filter();
        assert_eq!(filter.max_price, ProductFilter::default().max_price);
    }
}
