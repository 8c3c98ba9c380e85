//! Cart and checkout route handlers.
//!
//! The cart lives in the visitor's session (see [`crate::middleware::Visitor`]).
//! Cart operations answer htmx requests with fragments and plain form posts
//! with a redirect.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use luxe_client::Envelope;
use luxe_core::store::{CartStore, KeyValueStorage, MAX_LINE_QUANTITY};
use luxe_core::{NewCartItem, Price, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireUser, Visitor};
use crate::models::{Flash, PageContext};
use crate::routes::{is_htmx, safe_return_path};
use crate::state::AppState;

/// Toast after a successful add.
pub const ADDED_TO_CART: &str = "محصول به سبد خرید اضافه شد";

/// Toast after a checkout submission; no order is placed.
pub const CHECKOUT_UNAVAILABLE: &str = "پرداخت آنلاین هنوز فعال نشده است";

/// Toast when the product has no stock left.
pub const OUT_OF_STOCK: &str = "این محصول در حال حاضر موجود نیست";

const ADD_FAILED: &str = "خطا در افزودن به سبد خرید";

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: Price,
    pub quantity: u32,
    pub line_total: Price,
    pub can_increase: bool,
    pub increase_to: u32,
    pub decrease_to: u32,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub item_count: u32,
    pub is_empty: bool,
}

impl CartView {
    /// Snapshot of a cart store. Shipping is always free.
    #[must_use]
    pub fn from_store<S: KeyValueStorage>(store: &CartStore<S>, state: &AppState) -> Self {
        let lines: Vec<CartLineView> = store
            .items()
            .iter()
            .map(|item| CartLineView {
                id: item.id.to_string(),
                name: item.name.clone(),
                image: state.api().image_url(Some(&item.image)),
                price: item.price,
                quantity: item.quantity,
                line_total: item.line_total(),
                can_increase: !item.at_stock_limit() && item.quantity < MAX_LINE_QUANTITY,
                increase_to: item.quantity.saturating_add(1),
                decrease_to: item.quantity.saturating_sub(1),
            })
            .collect();
        let subtotal = store.subtotal();
        let shipping = Price::ZERO;

        Self {
            is_empty: lines.is_empty(),
            lines,
            subtotal,
            shipping,
            total: subtotal + shipping,
            item_count: store.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub return_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Badge plus an out-of-band toast, returned after an htmx add.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_added.html")]
pub struct CartAddedTemplate {
    pub count: u32,
    pub flash: Flash,
}

/// Checkout form template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Checkout form fields. Nothing is persisted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

/// Respond to a cart change: the items fragment for htmx, else a redirect.
fn cart_changed(headers: &HeaderMap, visitor: &Visitor, state: &AppState) -> Response {
    if is_htmx(headers) {
        let cart = CartView::from_store(&visitor.store, state);
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartItemsTemplate { cart },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(state, visitor))]
pub async fn show(State(state): State<AppState>, visitor: Visitor) -> Result<CartShowTemplate> {
    let page = PageContext::load(&visitor).await?;
    let cart = CartView::from_store(&visitor.store, &state);
    Ok(CartShowTemplate { page, cart })
}

/// Add one unit of a product to the cart.
///
/// The product is looked up so the stored name, price and image come from
/// the backend rather than the form. Products with no stock are refused.
#[instrument(skip(state, visitor, headers))]
pub async fn add(
    State(state): State<AppState>,
    mut visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    let back = safe_return_path(form.return_to.as_deref(), "/cart");

    let product = state
        .api()
        .anonymous()
        .get_product(&id)
        .await
        .and_then(Envelope::into_data);

    let flash = match product {
        Ok(product) if !product.in_stock() => {
            tracing::info!(product_id = %id, "Refused out-of-stock product");
            Flash::error(OUT_OF_STOCK)
        }
        Ok(product) => {
            visitor.store.add_to_cart(NewCartItem::from(&product));
            visitor.save().await?;
            add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
            Flash::success(ADDED_TO_CART)
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to add item to cart");
            Flash::error(e.user_message_or(ADD_FAILED))
        }
    };

    if is_htmx(&headers) {
        let count = visitor.store.item_count();
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartAddedTemplate { count, flash },
        )
            .into_response());
    }

    visitor.flash(flash).await?;
    Ok(Redirect::to(&back).into_response())
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state, visitor, headers))]
pub async fn update(
    State(state): State<AppState>,
    mut visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    let quantity = match visitor.store.get(&id) {
        Some(line) => match line.stock {
            Some(cap) if form.quantity > i64::from(cap) => i64::from(cap),
            _ => form.quantity,
        },
        None => form.quantity,
    };
    visitor.store.update_quantity(&id, quantity);
    visitor.save().await?;
    Ok(cart_changed(&headers, &visitor, &state))
}

/// Remove a line from the cart.
#[instrument(skip(state, visitor, headers))]
pub async fn remove(
    State(state): State<AppState>,
    mut visitor: Visitor,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    visitor.store.remove_from_cart(&ProductId::new(form.product_id));
    visitor.save().await?;
    Ok(cart_changed(&headers, &visitor, &state))
}

/// Empty the cart.
#[instrument(skip(state, visitor, headers))]
pub async fn clear(
    State(state): State<AppState>,
    mut visitor: Visitor,
    headers: HeaderMap,
) -> Result<Response> {
    visitor.store.clear_cart();
    visitor.save().await?;
    Ok(cart_changed(&headers, &visitor, &state))
}

/// Get cart count badge (HTMX).
#[instrument(skip(visitor))]
pub async fn count(visitor: Visitor) -> CartCountTemplate {
    CartCountTemplate {
        count: visitor.store.item_count(),
    }
}

/// Display the checkout form, prefilled from the profile.
#[instrument(skip(state, visitor))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireUser(visitor): RequireUser,
) -> Result<Response> {
    if visitor.store.items().is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let page = PageContext::load(&visitor).await?;
    let cart = CartView::from_store(&visitor.store, &state);
    let user = visitor.user();
    let text = |value: Option<&String>| value.cloned().unwrap_or_default();

    Ok(CheckoutTemplate {
        page,
        cart,
        first_name: text(user.and_then(|u| u.first_name.as_ref())),
        last_name: text(user.and_then(|u| u.last_name.as_ref())),
        email: text(user.and_then(|u| u.email.as_ref())),
        phone: user.map(|u| u.phone.clone()).unwrap_or_default(),
    }
    .into_response())
}

/// Accept the checkout form. No order is created and the cart is kept.
#[instrument(skip(visitor, form))]
pub async fn submit_checkout(
    RequireUser(visitor): RequireUser,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect> {
    tracing::info!(
        items = visitor.store.item_count(),
        has_address = !form.address.trim().is_empty(),
        "Checkout submitted"
    );
    visitor.flash(Flash::info(CHECKOUT_UNAVAILABLE)).await?;
    Ok(Redirect::to("/checkout"))
}
