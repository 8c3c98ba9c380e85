//! Products and collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CollectionId, Price, ProductId, default_true, lenient, nullable};

/// Average rating of a product's approved comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    #[serde(default, alias = "avg", deserialize_with = "nullable")]
    pub average: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub count: u64,
}

impl RatingSummary {
    /// Average rounded to one decimal, for display.
    #[must_use]
    pub fn rounded(&self) -> f64 {
        (self.average * 10.0).round() / 10.0
    }

    /// Number of whole stars to fill (0-5).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn filled_stars(&self) -> u8 {
        self.average.round().clamp(0.0, 5.0) as u8
    }
}

/// A product's collection, either as a bare id or an embedded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionRef {
    Id(CollectionId),
    Embedded {
        #[serde(rename = "_id")]
        id: CollectionId,
        #[serde(default, deserialize_with = "nullable")]
        name: String,
        #[serde(default, deserialize_with = "nullable")]
        slug: String,
    },
}

impl CollectionRef {
    #[must_use]
    pub const fn id(&self) -> &CollectionId {
        match self {
            Self::Id(id) | Self::Embedded { id, .. } => id,
        }
    }

    /// Collection name when the backend embedded the document.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Embedded { name, .. } => Some(name.as_str()).filter(|n| !n.is_empty()),
        }
    }
}

/// A product as served by `/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub price: Price,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sub_category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub section: String,
    #[serde(default, deserialize_with = "lenient")]
    pub collection: Option<CollectionRef>,
    #[serde(default)]
    pub collection_id: Option<CollectionId>,
    #[serde(default, deserialize_with = "nullable")]
    pub images: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub featured: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating_summary: Option<RatingSummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Id of the collection, embedded or referenced.
    #[must_use]
    pub fn collection_key(&self) -> Option<&CollectionId> {
        self.collection
            .as_ref()
            .map(CollectionRef::id)
            .or(self.collection_id.as_ref())
    }

    /// First image path, falling back to the single `image` field.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .map(String::as_str)
            .find(|i| !i.trim().is_empty())
            .or_else(|| self.image.as_deref().filter(|i| !i.trim().is_empty()))
    }

    /// Stock as a cart cap; negative or missing stock means no cap.
    #[must_use]
    pub fn stock_cap(&self) -> Option<u32> {
        self.stock.and_then(|s| u32::try_from(s).ok())
    }

    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_none_or(|s| s > 0)
    }
}

/// A section inside a collection (e.g. "living room").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub sort_order: i32,
}

/// A curated collection of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(rename = "_id", alias = "id")]
    pub id: CollectionId,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub slug: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub sort_order: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub sections: Vec<Section>,
}

impl Collection {
    /// Whether a route parameter names this collection by slug or by id.
    #[must_use]
    pub fn matches_key(&self, key: &str) -> bool {
        (!self.slug.is_empty() && self.slug == key) || self.id.as_str() == key
    }

    /// Active sections in display order.
    #[must_use]
    pub fn active_sections(&self) -> Vec<&Section> {
        let mut sections: Vec<&Section> = self.sections.iter().filter(|s| s.is_active).collect();
        sections.sort_by_key(|s| s.sort_order);
        sections
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_with_embedded_collection() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "name": "مبل راحتی",
            "price": 12500000,
            "stock": 3,
            "collection": {"_id": "c1", "name": "پاییزه"},
            "images": ["a.jpg"],
            "featured": true
        }))
        .unwrap();
        assert_eq!(product.collection_key().unwrap().as_str(), "c1");
        assert_eq!(product.collection.as_ref().unwrap().name(), Some("پاییزه"));
        assert_eq!(product.price, Price::toman(12_500_000));
        assert!(product.is_active);
        assert_eq!(product.stock_cap(), Some(3));
    }

    #[test]
    fn test_product_with_collection_id_only() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p2",
            "collection": null,
            "collectionId": "c9",
            "images": null,
            "image": "/uploads/x.png"
        }))
        .unwrap();
        assert_eq!(product.collection_key().unwrap().as_str(), "c9");
        assert_eq!(product.primary_image(), Some("/uploads/x.png"));
        assert!(product.in_stock());
    }

    #[test]
    fn test_product_with_string_collection() {
        let product: Product =
            serde_json::from_value(json!({"_id": "p3", "collection": "c2"})).unwrap();
        assert_eq!(product.collection_key().unwrap().as_str(), "c2");
        assert!(product.collection.unwrap().name().is_none());
    }

    #[test]
    fn test_collection_matches_slug_or_id() {
        let collection: Collection =
            serde_json::from_value(json!({"_id": "c1", "slug": "autumn"})).unwrap();
        assert!(collection.matches_key("autumn"));
        assert!(collection.matches_key("c1"));
        assert!(!collection.matches_key("winter"));
    }

    #[test]
    fn test_active_sections_sorted() {
        let collection: Collection = serde_json::from_value(json!({
            "_id": "c1",
            "sections": [
                {"name": "b", "sortOrder": 2},
                {"name": "hidden", "isActive": false},
                {"name": "a", "sortOrder": 1}
            ]
        }))
        .unwrap();
        let names: Vec<&str> = collection
            .active_sections()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_rating_summary_stars() {
        let summary = RatingSummary {
            average: 4.46,
            count: 7,
        };
        assert!((summary.rounded() - 4.5).abs() < f64::EPSILON);
        assert_eq!(summary.filled_stars(), 4);
    }
}
