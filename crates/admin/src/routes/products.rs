//! Products tab and product create/update/delete.
//!
//! Product forms are multipart because they carry images; the text fields
//! map onto [`ProductDraft`] and every non-empty `images` part becomes an
//! upload.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Multipart, Path, State};
use axum::response::Redirect;
use luxe_client::{ApiClient, CollectionQuery, Envelope, ImageUpload, ProductQuery, ProductUpload};
use luxe_core::catalog::LIST_FETCH_LIMIT;
use luxe_core::validation::{NO_COLLECTIONS, ProductDraft};
use luxe_core::{Collection, CollectionRef, Price, Product, ProductId};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminSession, RequireAdmin};
use crate::models::{Flash, PageContext};
use crate::routes::dashboard::{DashboardQuery, Tab, TabLink, tab_links};
use crate::routes::into_page;
use crate::state::AppState;

/// Toast after a product was created.
pub const PRODUCT_CREATED: &str = "محصول با موفقیت اضافه شد";
/// Toast after a product was updated.
pub const PRODUCT_UPDATED: &str = "محصول با موفقیت به‌روزرسانی شد";
/// Toast after a product was deleted.
pub const PRODUCT_DELETED: &str = "محصول با موفقیت حذف شد";

const CREATE_FAILED: &str = "خطا در ایجاد محصول";
const UPDATE_FAILED: &str = "خطا در به‌روزرسانی محصول";
const DELETE_FAILED: &str = "خطا در حذف محصول";
const PRODUCTS_FAILED: &str = "خطا در دریافت محصولات";
const COLLECTIONS_FAILED: &str = "خطا در دریافت مجموعه‌ها";
const PRODUCT_MISSING: &str = "محصول یافت نشد";

const TAB_PATH: &str = "/?tab=products";

/// A row of the products table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub image: String,
    pub price: Price,
    pub stock: String,
    pub category: String,
    pub collection: String,
    pub section: String,
    pub is_active: bool,
    pub featured: bool,
}

impl ProductRow {
    fn new(product: &Product, collections: &[Collection], api: &ApiClient) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            image: api.image_url(product.primary_image()),
            price: product.price,
            stock: product.stock.map(|s| s.to_string()).unwrap_or_default(),
            category: product.category.clone(),
            collection: collection_name(product, collections),
            section: product.section.clone(),
            is_active: product.is_active,
            featured: product.featured,
        }
    }
}

/// Embedded collection name, else the name of the listed collection with
/// that id.
fn collection_name(product: &Product, collections: &[Collection]) -> String {
    if let Some(name) = product.collection.as_ref().and_then(CollectionRef::name) {
        return name.to_owned();
    }
    product
        .collection_key()
        .and_then(|id| collections.iter().find(|c| &c.id == id))
        .map(|c| c.name.clone())
        .unwrap_or_default()
}

/// A collection in the product form's select.
#[derive(Debug, Clone)]
pub struct CollectionOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// The create/edit form, prefilled when editing.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub action: String,
    pub heading: &'static str,
    pub submit: &'static str,
    pub editing: bool,
    pub name: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    pub section: String,
    pub price: String,
    pub stock: String,
    pub tags: String,
    pub is_active: bool,
    pub featured: bool,
    pub images: Vec<String>,
}

impl ProductFormView {
    fn blank() -> Self {
        Self {
            action: "/products".to_owned(),
            heading: "افزودن محصول",
            submit: "ایجاد محصول",
            is_active: true,
            ..Default::default()
        }
    }

    fn editing(product: &Product, api: &ApiClient) -> Self {
        Self {
            action: format!("/products/{}", product.id),
            heading: "ویرایش محصول",
            submit: "ذخیره تغییرات",
            editing: true,
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            sub_category: product.sub_category.clone(),
            section: product.section.clone(),
            price: product.price.amount().normalize().to_string(),
            stock: product.stock.unwrap_or(0).to_string(),
            tags: product.tags.join(", "),
            is_active: product.is_active,
            featured: product.featured,
            images: product
                .images
                .iter()
                .map(|i| api.image_url(Some(i.as_str())))
                .collect(),
        }
    }
}

/// Collection choices for the form. With no collections the only choice is
/// the placeholder, which validation rejects.
fn collection_options(collections: &[Collection], selected: Option<&str>) -> Vec<CollectionOption> {
    if collections.is_empty() {
        return vec![CollectionOption {
            id: NO_COLLECTIONS.to_owned(),
            name: "ابتدا یک مجموعه ایجاد کنید".to_owned(),
            selected: true,
        }];
    }
    collections
        .iter()
        .map(|c| CollectionOption {
            id: c.id.to_string(),
            name: c.name.clone(),
            selected: selected == Some(c.id.as_str()),
        })
        .collect()
}

/// Every section name across collections, for the section suggestions.
fn section_names(collections: &[Collection]) -> Vec<String> {
    let mut names: Vec<String> = collections
        .iter()
        .flat_map(|c| c.sections.iter().map(|s| s.name.clone()))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Products tab template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/products.html")]
pub struct ProductsTabTemplate {
    pub page: PageContext,
    pub tabs: Vec<TabLink>,
    pub products: Vec<ProductRow>,
    pub form: ProductFormView,
    pub collections: Vec<CollectionOption>,
    pub sections: Vec<String>,
    pub search: String,
}

/// Build the products tab.
pub(crate) async fn tab(
    state: &AppState,
    admin: &AdminSession,
    query: &DashboardQuery,
) -> Result<ProductsTabTemplate> {
    let mut page = PageContext::load(admin).await?;
    let api = admin.api(state.api());
    let search = query.search.clone().unwrap_or_default().trim().to_owned();

    let product_query = ProductQuery {
        limit: Some(LIST_FETCH_LIMIT),
        search: (!search.is_empty()).then(|| search.clone()),
        ..Default::default()
    };
    let collection_query = CollectionQuery {
        limit: Some(LIST_FETCH_LIMIT),
        ..Default::default()
    };
    let edit_id = query.edit.as_deref().filter(|id| !id.is_empty()).map(ProductId::new);
    let (products, collections, editing) = tokio::join!(
        api.list_products(&product_query),
        api.list_collections(&collection_query),
        async {
            match &edit_id {
                Some(id) => Some(api.get_product(id).await.and_then(Envelope::into_data)),
                None => None,
            }
        }
    );

    let collections = into_page(collections).map(|l| l.items).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch collections");
        page.push(Flash::error(e.user_message_or(COLLECTIONS_FAILED)));
        Vec::new()
    });
    let products = match into_page(products) {
        Ok(list) => list
            .items
            .iter()
            .map(|p| ProductRow::new(p, &collections, state.api()))
            .collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch products");
            page.push(Flash::error(e.user_message_or(PRODUCTS_FAILED)));
            Vec::new()
        }
    };

    let (form, selected) = match editing {
        Some(Ok(product)) => (
            ProductFormView::editing(&product, state.api()),
            product.collection_key().map(ToString::to_string),
        ),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Failed to fetch product for editing");
            page.push(Flash::error(e.user_message_or(PRODUCT_MISSING)));
            (ProductFormView::blank(), None)
        }
        None => (ProductFormView::blank(), None),
    };

    Ok(ProductsTabTemplate {
        page,
        tabs: tab_links(Tab::Products),
        products,
        form,
        sections: section_names(&collections),
        collections: collection_options(&collections, selected.as_deref()),
        search,
    })
}

/// Read the multipart product form.
async fn read_form(mut multipart: Multipart) -> Result<(ProductDraft, Vec<ImageUpload>)> {
    let mut draft = ProductDraft::default();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "images" {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field.bytes().await?;
            // Browsers send an empty part when no file was picked
            if !file_name.is_empty() && !bytes.is_empty() {
                images.push(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => draft.name = value,
            "description" => draft.description = value,
            "category" => draft.category = value,
            "sub_category" => draft.sub_category = value,
            "collection" => draft.collection = value,
            "section" => draft.section = value,
            "price" => draft.price = value,
            "stock" => draft.stock = value,
            "tags" => draft.tags = value,
            "is_active" => draft.is_active = value == "true",
            "featured" => draft.featured = value == "true",
            _ => {}
        }
    }

    Ok((draft, images))
}

/// Create a product.
#[instrument(skip(state, admin, multipart))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Redirect> {
    let (draft, images) = read_form(multipart).await?;
    let fields = match draft.validate(images.len(), true) {
        Ok(fields) => fields,
        Err(e) => {
            admin.flash(Flash::error(e.to_string())).await?;
            return Ok(Redirect::to(TAB_PATH));
        }
    };
    if let Err(e) = admin.throttle_submit().await? {
        admin.flash(Flash::error(e.to_string())).await?;
        return Ok(Redirect::to(TAB_PATH));
    }

    let result = admin
        .api(state.api())
        .create_product(ProductUpload { fields, images })
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!("Product created");
            admin.flash(Flash::success(PRODUCT_CREATED)).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create product");
            admin
                .flash(Flash::error(e.user_message_or(CREATE_FAILED)))
                .await?;
        }
    }
    Ok(Redirect::to(TAB_PATH))
}

/// Update a product; images are optional and appended.
#[instrument(skip(state, admin, multipart))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect> {
    let id = ProductId::new(id);
    let edit_path = format!("{TAB_PATH}&edit={id}");

    let (draft, images) = read_form(multipart).await?;
    let fields = match draft.validate(images.len(), false) {
        Ok(fields) => fields,
        Err(e) => {
            admin.flash(Flash::error(e.to_string())).await?;
            return Ok(Redirect::to(&edit_path));
        }
    };

    let result = admin
        .api(state.api())
        .update_product(&id, ProductUpload { fields, images })
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!(product_id = %id, "Product updated");
            admin.flash(Flash::success(PRODUCT_UPDATED)).await?;
            Ok(Redirect::to(TAB_PATH))
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to update product");
            admin
                .flash(Flash::error(e.user_message_or(UPDATE_FAILED)))
                .await?;
            Ok(Redirect::to(&edit_path))
        }
    }
}

/// Delete a product.
#[instrument(skip(state, admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = ProductId::new(id);
    let result = admin
        .api(state.api())
        .delete_product(&id)
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!(product_id = %id, "Product deleted");
            admin.flash(Flash::success(PRODUCT_DELETED)).await?;
        }
        Err(e) => {
            tracing::warn!(product_id = %id, error = %e, "Failed to delete product");
            admin
                .flash(Flash::error(e.user_message_or(DELETE_FAILED)))
                .await?;
        }
    }
    Ok(Redirect::to(TAB_PATH))
}
