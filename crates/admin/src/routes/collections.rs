//! Collections tab and collection create/update/delete.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use luxe_client::{ApiClient, CollectionQuery, Envelope};
use luxe_core::catalog::LIST_FETCH_LIMIT;
use luxe_core::types::price::persian_digits;
use luxe_core::validation::{CollectionDraft, format_sections};
use luxe_core::{Collection, CollectionId};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{AdminSession, RequireAdmin};
use crate::models::{Flash, PageContext};
use crate::routes::dashboard::{DashboardQuery, Tab, TabLink, tab_links};
use crate::routes::into_page;
use crate::state::AppState;

/// Toast after a collection was created.
pub const COLLECTION_CREATED: &str = "مجموعه با موفقیت اضافه شد";
/// Toast after a collection was updated.
pub const COLLECTION_UPDATED: &str = "مجموعه با موفقیت به‌روزرسانی شد";
/// Toast after a collection was deleted.
pub const COLLECTION_DELETED: &str = "مجموعه با موفقیت حذف شد";

const CREATE_FAILED: &str = "خطا در ایجاد مجموعه";
const UPDATE_FAILED: &str = "خطا در به‌روزرسانی مجموعه";
const DELETE_FAILED: &str = "خطا در حذف مجموعه";
const COLLECTIONS_FAILED: &str = "خطا در دریافت مجموعه‌ها";
const COLLECTION_MISSING: &str = "مجموعه یافت نشد";

const TAB_PATH: &str = "/?tab=collections";

/// A row of the collections table.
#[derive(Debug, Clone)]
pub struct CollectionRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub image: String,
    pub description: String,
    pub sections: String,
    pub sort_order: String,
    pub is_active: bool,
}

impl CollectionRow {
    fn new(collection: &Collection, api: &ApiClient) -> Self {
        Self {
            id: collection.id.to_string(),
            name: collection.name.clone(),
            slug: collection.slug.clone(),
            image: api.image_url(collection.image.as_deref()),
            description: collection.description.clone(),
            sections: section_summary(collection),
            sort_order: persian_digits(&collection.sort_order.to_string()),
            is_active: collection.is_active,
        }
    }
}

/// Active section names joined for the table, or a dash.
fn section_summary(collection: &Collection) -> String {
    let names: Vec<&str> = collection
        .active_sections()
        .into_iter()
        .map(|s| s.name.as_str())
        .collect();
    if names.is_empty() {
        "-".to_owned()
    } else {
        names.join("، ")
    }
}

/// The create/edit form, prefilled when editing.
#[derive(Debug, Clone, Default)]
pub struct CollectionFormView {
    pub action: String,
    pub heading: &'static str,
    pub submit: &'static str,
    pub editing: bool,
    pub name: String,
    pub description: String,
    pub image: String,
    pub sort_order: String,
    pub sections: String,
    pub is_active: bool,
}

impl CollectionFormView {
    fn blank() -> Self {
        Self {
            action: "/collections".to_owned(),
            heading: "افزودن مجموعه",
            submit: "ایجاد مجموعه",
            sort_order: "0".to_owned(),
            is_active: true,
            ..Default::default()
        }
    }

    fn editing(collection: &Collection) -> Self {
        Self {
            action: format!("/collections/{}", collection.id),
            heading: "ویرایش مجموعه",
            submit: "ذخیره تغییرات",
            editing: true,
            name: collection.name.clone(),
            description: collection.description.clone(),
            image: collection.image.clone().unwrap_or_default(),
            sort_order: collection.sort_order.to_string(),
            sections: format_sections(&collection.sections),
            is_active: collection.is_active,
        }
    }
}

/// Collections tab template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard/collections.html")]
pub struct CollectionsTabTemplate {
    pub page: PageContext,
    pub tabs: Vec<TabLink>,
    pub collections: Vec<CollectionRow>,
    pub form: CollectionFormView,
}

/// Build the collections tab. The collection being edited is taken from the
/// fetched list, falling back to a direct lookup.
pub(crate) async fn tab(
    state: &AppState,
    admin: &AdminSession,
    query: &DashboardQuery,
) -> Result<CollectionsTabTemplate> {
    let mut page = PageContext::load(admin).await?;
    let api = admin.api(state.api());

    let list_query = CollectionQuery {
        limit: Some(LIST_FETCH_LIMIT),
        ..Default::default()
    };
    let collections = into_page(api.list_collections(&list_query).await)
        .map(|l| l.items)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to fetch collections");
            page.push(Flash::error(e.user_message_or(COLLECTIONS_FAILED)));
            Vec::new()
        });

    let form = match query.edit.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => {
            let id = CollectionId::new(id);
            let found = match collections.iter().find(|c| c.id == id) {
                Some(c) => Ok(c.clone()),
                None => api.get_collection(&id).await.and_then(Envelope::into_data),
            };
            match found {
                Ok(collection) => CollectionFormView::editing(&collection),
                Err(e) => {
                    tracing::warn!(collection_id = %id, error = %e, "Failed to fetch collection for editing");
                    page.push(Flash::error(e.user_message_or(COLLECTION_MISSING)));
                    CollectionFormView::blank()
                }
            }
        }
        None => CollectionFormView::blank(),
    };

    Ok(CollectionsTabTemplate {
        page,
        tabs: tab_links(Tab::Collections),
        collections: collections
            .iter()
            .map(|c| CollectionRow::new(c, state.api()))
            .collect(),
        form,
    })
}

/// Create a collection.
#[instrument(skip(state, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<CollectionDraft>,
) -> Result<Redirect> {
    let collection = match form.validate() {
        Ok(collection) => collection,
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
        .create_collection(&collection)
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!("Collection created");
            admin.flash(Flash::success(COLLECTION_CREATED)).await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create collection");
            admin
                .flash(Flash::error(e.user_message_or(CREATE_FAILED)))
                .await?;
        }
    }
    Ok(Redirect::to(TAB_PATH))
}

/// Update a collection, sections included.
#[instrument(skip(state, admin, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<CollectionDraft>,
) -> Result<Redirect> {
    let id = CollectionId::new(id);
    let edit_path = format!("{TAB_PATH}&edit={id}");

    let collection = match form.validate() {
        Ok(collection) => collection,
        Err(e) => {
            admin.flash(Flash::error(e.to_string())).await?;
            return Ok(Redirect::to(&edit_path));
        }
    };

    let result = admin
        .api(state.api())
        .update_collection(&id, &collection)
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!(collection_id = %id, "Collection updated");
            admin.flash(Flash::success(COLLECTION_UPDATED)).await?;
            Ok(Redirect::to(TAB_PATH))
        }
        Err(e) => {
            tracing::warn!(collection_id = %id, error = %e, "Failed to update collection");
            admin
                .flash(Flash::error(e.user_message_or(UPDATE_FAILED)))
                .await?;
            Ok(Redirect::to(&edit_path))
        }
    }
}

/// Delete a collection.
#[instrument(skip(state, admin))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = CollectionId::new(id);
    let result = admin
        .api(state.api())
        .delete_collection(&id)
        .await
        .and_then(Envelope::ensure_success);

    match result {
        Ok(_) => {
            tracing::info!(collection_id = %id, "Collection deleted");
            admin.flash(Flash::success(COLLECTION_DELETED)).await?;
        }
        Err(e) => {
            tracing::warn!(collection_id = %id, error = %e, "Failed to delete collection");
            admin
                .flash(Flash::error(e.user_message_or(DELETE_FAILED)))
                .await?;
        }
    }
    Ok(Redirect::to(TAB_PATH))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn collection() -> Collection {
        serde_json::from_value(json!({
            "_id": "c1",
            "name": "کلاسیک",
            "sortOrder": 12,
            "sections": [
                {"name": "پذیرایی", "description": "مبلمان", "sortOrder": 2},
                {"name": "خواب", "sortOrder": 1},
                {"name": "آرشیو", "isActive": false}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_section_summary_lists_active_in_order() {
        assert_eq!(section_summary(&collection()), "خواب، پذیرایی");
    }

    #[test]
    fn test_edit_form_prefills_sections() {
        let form = CollectionFormView::editing(&collection());
        assert!(form.editing);
        assert_eq!(form.action, "/collections/c1");
        assert_eq!(form.sort_order, "12");
        assert_eq!(form.sections, "پذیرایی | مبلمان | \nخواب\nآرشیو");
    }
}
