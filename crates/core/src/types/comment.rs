//! Product comments and their replies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::full_name;
use super::{CommentId, CommentStatus, ProductId, ReplyId, UserId, lenient, nullable};

/// Fallback author name when the backend sends no usable name.
pub const ANONYMOUS_AUTHOR: &str = "کاربر";

/// Fallback product name when the comment's product is not populated.
pub const UNKNOWN_PRODUCT: &str = "محصول";

/// Author of a comment or reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    #[serde(rename = "_id", default, deserialize_with = "nullable")]
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl CommentAuthor {
    /// Username, else "first last", else `کاربر`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_owned)
            .or_else(|| full_name(self.first_name.as_deref(), self.last_name.as_deref()))
            .unwrap_or_else(|| ANONYMOUS_AUTHOR.to_owned())
    }
}

/// The product a comment belongs to, as an id or a populated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentProduct {
    Id(ProductId),
    Embedded {
        #[serde(rename = "_id", default)]
        id: ProductId,
        #[serde(default)]
        name: Option<String>,
    },
}

impl CommentProduct {
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        match self {
            Self::Id(id) | Self::Embedded { id, .. } => id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Embedded {
                name: Some(name), ..
            } if !name.is_empty() => name,
            _ => UNKNOWN_PRODUCT,
        }
    }
}

/// A reply to a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(rename = "_id", alias = "id")]
    pub id: ReplyId,
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<CommentAuthor>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: CommentStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Reply {
    #[must_use]
    pub fn author_name(&self) -> String {
        self.user
            .as_ref()
            .map_or_else(|| ANONYMOUS_AUTHOR.to_owned(), CommentAuthor::display_name)
    }
}

/// A product comment with its rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", alias = "id")]
    pub id: CommentId,
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,
    #[serde(default, deserialize_with = "nullable")]
    pub rating: u8,
    #[serde(default, deserialize_with = "nullable")]
    pub status: CommentStatus,
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<CommentAuthor>,
    #[serde(default, deserialize_with = "lenient")]
    pub product: Option<CommentProduct>,
    #[serde(default, deserialize_with = "nullable")]
    pub replies: Vec<Reply>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    #[must_use]
    pub fn author_name(&self) -> String {
        self.user
            .as_ref()
            .map_or_else(|| ANONYMOUS_AUTHOR.to_owned(), CommentAuthor::display_name)
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        self.product
            .as_ref()
            .map_or(UNKNOWN_PRODUCT, CommentProduct::name)
    }

    /// Replies visible on the public product page.
    pub fn approved_replies(&self) -> impl Iterator<Item = &Reply> {
        self.replies
            .iter()
            .filter(|r| r.status == CommentStatus::Approved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_author_name_fallbacks() {
        let mut author = CommentAuthor::default();
        assert_eq!(author.display_name(), ANONYMOUS_AUTHOR);
        author.first_name = Some("مریم".into());
        author.last_name = Some("احمدی".into());
        assert_eq!(author.display_name(), "مریم احمدی");
        author.username = Some("maryam".into());
        assert_eq!(author.display_name(), "maryam");
    }

    #[test]
    fn test_comment_defaults() {
        let comment: Comment = serde_json::from_value(json!({
            "_id": "c1",
            "content": "عالی بود",
            "status": null,
            "product": "p1",
            "user": null
        }))
        .unwrap();
        assert_eq!(comment.status, CommentStatus::Pending);
        assert_eq!(comment.author_name(), ANONYMOUS_AUTHOR);
        assert_eq!(comment.product_name(), UNKNOWN_PRODUCT);
        assert_eq!(comment.product.unwrap().id().as_str(), "p1");
    }

    #[test]
    fn test_populated_product_name_and_replies() {
        let comment: Comment = serde_json::from_value(json!({
            "_id": "c1",
            "rating": 4,
            "product": {"_id": "p1", "name": "میز ناهارخوری"},
            "replies": [
                {"_id": "r1", "content": "ممنون", "status": "approved"},
                {"_id": "r2", "content": "?", "status": "pending"}
            ]
        }))
        .unwrap();
        assert_eq!(comment.product_name(), "میز ناهارخوری");
        assert_eq!(comment.approved_replies().count(), 1);
    }
}
