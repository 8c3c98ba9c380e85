//! Form validation and sanitization.
//!
//! Each draft holds raw form input. `validate` checks fields in a fixed order
//! and reports the first failure with the message shown to the user; on
//! success it returns the sanitized value sent to the backend.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::price::latin_digits;
use crate::types::{Address, CollectionId, Location, Price, Section};

/// Placeholder value of the collection picker when no collection exists.
pub const NO_COLLECTIONS: &str = "no-collections";

/// Minimum gap between two create submissions from the same visitor.
pub const SUBMIT_INTERVAL: Duration = Duration::from_secs(2);

/// Longest accepted address title.
pub const MAX_ADDRESS_NAME: usize = 255;

/// Default comment rating.
pub const DEFAULT_RATING: u8 = 5;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("<[^>]*>").expect("Invalid regex"));

/// Validation failures, displayed verbatim to the user.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("لطفاً کمی صبر کنید")]
    TooSoon,

    #[error("نام محصول الزامی است")]
    ProductNameRequired,
    #[error("توضیحات محصول الزامی است")]
    ProductDescriptionRequired,
    #[error("دسته محصول الزامی است")]
    ProductCategoryRequired,
    #[error("زیردسته محصول الزامی است")]
    ProductSubCategoryRequired,
    #[error("ابتدا یک مجموعه ایجاد کنید")]
    ProductCollectionRequired,
    #[error("بخش محصول الزامی است")]
    ProductSectionRequired,
    #[error("قیمت محصول باید بیشتر از صفر باشد")]
    ProductPriceInvalid,
    #[error("موجودی محصول نمی‌تواند منفی باشد")]
    ProductStockInvalid,
    #[error("حداقل یک تصویر انتخاب کنید")]
    ProductImageRequired,

    #[error("نام مجموعه الزامی است")]
    CollectionNameRequired,
    #[error("توضیحات مجموعه الزامی است")]
    CollectionDescriptionRequired,
    #[error("نام مجموعه باید حداقل 2 کاراکتر باشد")]
    CollectionNameTooShort,
    #[error("نام بخش الزامی است")]
    SectionNameRequired,

    #[error("عنوان آدرس الزامی است")]
    AddressNameRequired,
    #[error("عنوان آدرس حداکثر {max} کاراکتر است")]
    AddressNameTooLong { max: usize },

    #[error("لطفاً ابتدا وارد شوید")]
    LoginRequired,
    #[error("لطفاً نظر خود را بنویسید")]
    CommentRequired,
    #[error("لطفاً پاسخ خود را بنویسید")]
    ReplyRequired,
    #[error("امتیاز باید بین ۱ تا ۵ باشد")]
    RatingOutOfRange,

    #[error("نام و پیام الزامی است")]
    ContactIncomplete,
}

/// Remove anything that looks like an HTML tag, then trim.
#[must_use]
pub fn strip_tags(input: &str) -> String {
    TAG_PATTERN.replace_all(input, "").trim().to_owned()
}

/// Refuse a create submission that follows the previous one too closely.
///
/// # Errors
///
/// Returns [`ValidationError::TooSoon`] within [`SUBMIT_INTERVAL`] of `last`.
pub fn check_submit_interval(
    last: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    let Some(last) = last else {
        return Ok(());
    };
    let elapsed = now.signed_duration_since(last);
    match elapsed.to_std() {
        Ok(elapsed) if elapsed >= SUBMIT_INTERVAL => Ok(()),
        // clock skew (negative elapsed) counts as too soon
        _ => Err(ValidationError::TooSoon),
    }
}

fn required(value: &str, error: ValidationError) -> Result<String, ValidationError> {
    let clean = strip_tags(value);
    if clean.is_empty() {
        return Err(error);
    }
    Ok(clean)
}

// ===== Products =====

/// Raw product form input from the admin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    pub collection: String,
    pub section: String,
    pub price: String,
    pub stock: String,
    pub is_active: bool,
    pub featured: bool,
    pub tags: String,
}

/// A product ready to send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    pub collection: CollectionId,
    pub section: String,
    pub price: Price,
    pub stock: u32,
    pub is_active: bool,
    pub featured: bool,
    pub tags: Vec<String>,
}

impl ValidProduct {
    /// Multipart text fields in the order the backend expects.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", self.description.clone()),
            ("subCategory", self.sub_category.clone()),
            ("category", self.category.clone()),
            ("collection", self.collection.to_string()),
            ("section", self.section.clone()),
            ("price", self.price.amount().normalize().to_string()),
            ("stock", self.stock.to_string()),
            ("isActive", self.is_active.to_string()),
            ("featured", self.featured.to_string()),
            ("tags", self.tags.join(",")),
        ]
    }
}

impl ProductDraft {
    /// Validate and sanitize.
    ///
    /// `image_count` is the number of uploaded files; at least one is
    /// required when `require_image` is set (product creation).
    ///
    /// # Errors
    ///
    /// Returns the first failing field's [`ValidationError`].
    pub fn validate(
        &self,
        image_count: usize,
        require_image: bool,
    ) -> Result<ValidProduct, ValidationError> {
        let name = required(&self.name, ValidationError::ProductNameRequired)?;
        let description = required(&self.description, ValidationError::ProductDescriptionRequired)?;
        let category = required(&self.category, ValidationError::ProductCategoryRequired)?;
        let sub_category =
            required(&self.sub_category, ValidationError::ProductSubCategoryRequired)?;

        let collection = self.collection.trim();
        if collection.is_empty() || collection == NO_COLLECTIONS {
            return Err(ValidationError::ProductCollectionRequired);
        }

        let section = required(&self.section, ValidationError::ProductSectionRequired)?;

        let price: Price = self
            .price
            .parse()
            .map_err(|_| ValidationError::ProductPriceInvalid)?;
        if !price.is_positive() {
            return Err(ValidationError::ProductPriceInvalid);
        }

        let stock = latin_digits(self.stock.trim())
            .parse::<i64>()
            .ok()
            .and_then(|s| u32::try_from(s).ok())
            .ok_or(ValidationError::ProductStockInvalid)?;

        if require_image && image_count == 0 {
            return Err(ValidationError::ProductImageRequired);
        }

        let tags = self
            .tags
            .split(',')
            .map(strip_tags)
            .filter(|t| !t.is_empty())
            .collect();

        Ok(ValidProduct {
            name,
            description,
            category,
            sub_category,
            collection: CollectionId::new(collection),
            section,
            price,
            stock,
            is_active: self.is_active,
            featured: self.featured,
            tags,
        })
    }
}

// ===== Collections =====

/// Raw collection form input from the admin.
///
/// `sections` is one section per line: `name | description | image`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectionDraft {
    pub name: String,
    pub description: String,
    pub image: String,
    pub is_active: bool,
    pub sort_order: String,
    pub sections: String,
}

/// A collection ready to send to the backend as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidCollection {
    pub name: String,
    pub description: String,
    pub image: String,
    pub is_active: bool,
    pub sort_order: i32,
    pub sections: Vec<Section>,
}

impl CollectionDraft {
    /// Validate and sanitize.
    ///
    /// # Errors
    ///
    /// Returns the first failing field's [`ValidationError`].
    pub fn validate(&self) -> Result<ValidCollection, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::CollectionNameRequired);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::CollectionDescriptionRequired);
        }
        let name = strip_tags(&self.name);
        if name.chars().count() < 2 {
            return Err(ValidationError::CollectionNameTooShort);
        }
        let description = required(
            &self.description,
            ValidationError::CollectionDescriptionRequired,
        )?;

        let sort_order = latin_digits(self.sort_order.trim()).parse().unwrap_or(0);

        Ok(ValidCollection {
            name,
            description,
            image: strip_tags(&self.image),
            is_active: self.is_active,
            sort_order,
            sections: parse_sections(&self.sections)?,
        })
    }
}

fn parse_sections(input: &str) -> Result<Vec<Section>, ValidationError> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| {
            let mut parts = line.split('|').map(strip_tags);
            let name = parts.next().unwrap_or_default();
            if name.is_empty() {
                return Err(ValidationError::SectionNameRequired);
            }
            let description = parts.next().unwrap_or_default();
            let image = parts.next().filter(|i| !i.is_empty());
            Ok(Section {
                name,
                description,
                image,
                is_active: true,
                sort_order: i32::try_from(index).unwrap_or(i32::MAX),
            })
        })
        .collect()
}

/// Render sections back into the one-per-line form syntax.
#[must_use]
pub fn format_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| {
            let image = s.image.as_deref().unwrap_or("");
            if image.is_empty() && s.description.is_empty() {
                s.name.clone()
            } else {
                format!("{} | {} | {}", s.name, s.description, image)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== Addresses =====

/// Raw address form input from the profile page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddressDraft {
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub postal_code: String,
    pub city_id: Option<i64>,
    pub address: String,
}

impl AddressDraft {
    /// Validate and sanitize.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::AddressNameRequired`] or
    /// [`ValidationError::AddressNameTooLong`].
    pub fn validate(&self) -> Result<Address, ValidationError> {
        let name = required(&self.name, ValidationError::AddressNameRequired)?;
        if name.chars().count() > MAX_ADDRESS_NAME {
            return Err(ValidationError::AddressNameTooLong {
                max: MAX_ADDRESS_NAME,
            });
        }

        Ok(Address {
            id: None,
            name,
            location: Location {
                lat: self.lat.unwrap_or(0.0),
                lng: self.lng.unwrap_or(0.0),
            },
            postal_code: latin_digits(&strip_tags(&self.postal_code)),
            city_id: self.city_id.unwrap_or(0),
            address: strip_tags(&self.address),
        })
    }
}

// ===== Comments =====

/// Raw comment or reply form input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentDraft {
    pub content: String,
    pub rating: Option<u8>,
}

/// A comment ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidComment {
    pub content: String,
    pub rating: u8,
}

impl CommentDraft {
    /// Validate a new comment.
    ///
    /// # Errors
    ///
    /// Fails when the visitor is anonymous, the content is empty, or the
    /// rating is outside 1-5.
    pub fn validate_comment(&self, signed_in: bool) -> Result<ValidComment, ValidationError> {
        if !signed_in {
            return Err(ValidationError::LoginRequired);
        }
        let content = required(&self.content, ValidationError::CommentRequired)?;
        let rating = self.rating.unwrap_or(DEFAULT_RATING);
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::RatingOutOfRange);
        }
        Ok(ValidComment { content, rating })
    }

    /// Validate a reply; the rating is ignored.
    ///
    /// # Errors
    ///
    /// Fails when the visitor is anonymous or the content is empty.
    pub fn validate_reply(&self, signed_in: bool) -> Result<String, ValidationError> {
        if !signed_in {
            return Err(ValidationError::LoginRequired);
        }
        required(&self.content, ValidationError::ReplyRequired)
    }
}

// ===== Contact =====

/// Raw contact form input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

/// A contact message ready to post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl ContactDraft {
    /// Validate and sanitize.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ContactIncomplete`] without a name or message.
    pub fn validate(&self) -> Result<ContactMessage, ValidationError> {
        let name = required(&self.name, ValidationError::ContactIncomplete)?;
        let message = required(&self.message, ValidationError::ContactIncomplete)?;
        let optional = |value: &str| Some(strip_tags(value)).filter(|v| !v.is_empty());

        Ok(ContactMessage {
            name,
            email: optional(&self.email),
            phone: optional(&latin_digits(&self.phone)),
            message,
            subject: optional(&self.subject),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    use super::*;

    fn product_draft() -> ProductDraft {
        ProductDraft {
            name: "<b>میز</b> کنسول".into(),
            description: "چوب راش".into(),
            category: "میز".into(),
            sub_category: "کنسول".into(),
            collection: "c1".into(),
            section: "پذیرایی".into(),
            price: "۴۵۰۰۰۰۰".into(),
            stock: "0".into(),
            is_active: true,
            featured: false,
            tags: " مدرن , <i>چوبی</i>,, ".into(),
        }
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("  <script>alert(1)</script>سلام "), "alert(1)سلام");
        assert_eq!(strip_tags("a < b"), "a < b");
    }

    #[test]
    fn test_valid_product_is_sanitized() {
        let product = product_draft().validate(1, true).unwrap();
        assert_eq!(product.name, "میز کنسول");
        assert_eq!(product.price, Price::toman(4_500_000));
        assert_eq!(product.stock, 0);
        assert_eq!(product.tags, vec!["مدرن", "چوبی"]);

        let fields = product.form_fields();
        assert!(fields.contains(&("price", "4500000".to_owned())));
        assert!(fields.contains(&("tags", "مدرن,چوبی".to_owned())));
        assert!(fields.contains(&("isActive", "true".to_owned())));
    }

    #[test]
    fn test_product_field_errors_in_order() {
        let cases: Vec<(fn(&mut ProductDraft), ValidationError)> = vec![
            (|d| d.name = "  ".into(), ValidationError::ProductNameRequired),
            (|d| d.description.clear(), ValidationError::ProductDescriptionRequired),
            (|d| d.category.clear(), ValidationError::ProductCategoryRequired),
            (|d| d.sub_category.clear(), ValidationError::ProductSubCategoryRequired),
            (|d| d.collection = NO_COLLECTIONS.into(), ValidationError::ProductCollectionRequired),
            (|d| d.section.clear(), ValidationError::ProductSectionRequired),
            (|d| d.price = "0".into(), ValidationError::ProductPriceInvalid),
            (|d| d.price = "abc".into(), ValidationError::ProductPriceInvalid),
            (|d| d.stock = "-1".into(), ValidationError::ProductStockInvalid),
            (|d| d.stock.clear(), ValidationError::ProductStockInvalid),
        ];
        for (mutate, expected) in cases {
            let mut draft = product_draft();
            mutate(&mut draft);
            assert_eq!(draft.validate(1, true).unwrap_err(), expected);
        }
    }

    #[test]
    fn test_product_images_required_only_on_create() {
        assert_eq!(
            product_draft().validate(0, true).unwrap_err(),
            ValidationError::ProductImageRequired
        );
        assert!(product_draft().validate(0, false).is_ok());
    }

    #[test]
    fn test_collection_validation() {
        let mut draft = CollectionDraft {
            name: "پاییز".into(),
            description: "کلکسیون پاییزه".into(),
            sort_order: "x".into(),
            sections: "نشیمن | مبلمان راحتی\n\nخواب | | /img/bed.jpg".into(),
            ..CollectionDraft::default()
        };
        let collection = draft.validate().unwrap();
        assert_eq!(collection.sort_order, 0);
        assert_eq!(collection.sections.len(), 2);
        assert_eq!(collection.sections[1].name, "خواب");
        assert_eq!(collection.sections[1].sort_order, 1);
        assert_eq!(collection.sections[1].image.as_deref(), Some("/img/bed.jpg"));

        draft.name = "ا".into();
        assert_eq!(draft.validate().unwrap_err(), ValidationError::CollectionNameTooShort);
        draft.name = String::new();
        assert_eq!(draft.validate().unwrap_err(), ValidationError::CollectionNameRequired);
        draft.name = "نام".into();
        draft.description = " ".into();
        assert_eq!(
            draft.validate().unwrap_err(),
            ValidationError::CollectionDescriptionRequired
        );
    }

    #[test]
    fn test_sections_round_trip_through_form_syntax() {
        let draft = CollectionDraft {
            name: "ab".into(),
            description: "d".into(),
            sections: "نشیمن\nخواب | اتاق خواب | bed.jpg".into(),
            ..CollectionDraft::default()
        };
        let sections = draft.validate().unwrap().sections;
        assert_eq!(format_sections(&sections), draft.sections);
    }

    #[test]
    fn test_address_validation() {
        let draft = AddressDraft {
            name: "<b>خانه</b>".into(),
            postal_code: "۱۲۳۴۵".into(),
            lat: Some(35.7),
            ..AddressDraft::default()
        };
        let address = draft.validate().unwrap();
        assert_eq!(address.name, "خانه");
        assert_eq!(address.postal_code, "12345");
        assert!((address.location.lat - 35.7).abs() < f64::EPSILON);

        let long = AddressDraft {
            name: "a".repeat(256),
            ..AddressDraft::default()
        };
        assert_eq!(
            long.validate().unwrap_err(),
            ValidationError::AddressNameTooLong { max: 255 }
        );
        assert_eq!(
            AddressDraft::default().validate().unwrap_err(),
            ValidationError::AddressNameRequired
        );
    }

    #[test]
    fn test_comment_validation() {
        let draft = CommentDraft {
            content: "خیلی خوب".into(),
            rating: None,
        };
        assert_eq!(draft.validate_comment(false).unwrap_err(), ValidationError::LoginRequired);
        assert_eq!(draft.validate_comment(true).unwrap().rating, 5);

        let bad_rating = CommentDraft {
            rating: Some(6),
            ..draft.clone()
        };
        assert_eq!(
            bad_rating.validate_comment(true).unwrap_err(),
            ValidationError::RatingOutOfRange
        );

        let empty = CommentDraft::default();
        assert_eq!(empty.validate_comment(true).unwrap_err(), ValidationError::CommentRequired);
        assert_eq!(empty.validate_reply(true).unwrap_err(), ValidationError::ReplyRequired);
        assert_eq!(draft.validate_reply(true).unwrap(), "خیلی خوب");
    }

    #[test]
    fn test_contact_validation() {
        let draft = ContactDraft {
            name: "رضا".into(),
            message: "سلام".into(),
            phone: "۰۹۱۲".into(),
            ..ContactDraft::default()
        };
        let message = draft.validate().unwrap();
        assert_eq!(message.phone.as_deref(), Some("0912"));
        assert!(message.email.is_none());

        let missing = ContactDraft {
            message: String::new(),
            ..draft
        };
        assert_eq!(missing.validate().unwrap_err(), ValidationError::ContactIncomplete);
    }

    #[test]
    fn test_submit_interval() {
        let now = Utc::now();
        assert!(check_submit_interval(None, now).is_ok());
        assert_eq!(
            check_submit_interval(Some(now - TimeDelta::milliseconds(1500)), now).unwrap_err(),
            ValidationError::TooSoon
        );
        assert!(check_submit_interval(Some(now - TimeDelta::seconds(2)), now).is_ok());
        assert!(check_submit_interval(Some(now + TimeDelta::seconds(1)), now).is_err());
    }
}
