//! Admin notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NotificationId, nullable};

/// What triggered a notification. Drives its icon and colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    UserRegistered,
    CommentCreated,
    ReplyCreated,
    OrderCreated,
    #[default]
    Other,
    Unknown(String),
}

impl NotificationKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::UserRegistered => "user_registered",
            Self::CommentCreated => "comment_created",
            Self::ReplyCreated => "reply_created",
            Self::OrderCreated => "order_created",
            Self::Other => "other",
            Self::Unknown(kind) => kind,
        }
    }

    /// Icon glyph for the notification list.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::UserRegistered => "👤",
            Self::CommentCreated => "💬",
            Self::ReplyCreated => "💬",
            Self::OrderCreated => "🛒",
            Self::Other | Self::Unknown(_) => "📦",
        }
    }

    /// CSS modifier class for the notification list.
    #[must_use]
    pub const fn tone(&self) -> &'static str {
        match self {
            Self::UserRegistered => "blue",
            Self::CommentCreated | Self::ReplyCreated => "green",
            Self::OrderCreated => "purple",
            Self::Other | Self::Unknown(_) => "orange",
        }
    }
}

impl From<String> for NotificationKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "user_registered" => Self::UserRegistered,
            "comment_created" => Self::CommentCreated,
            "reply_created" => Self::ReplyCreated,
            "order_created" => Self::OrderCreated,
            "other" => Self::Other,
            _ => Self::Unknown(kind),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Unknown(kind) => kind,
            known => known.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", alias = "id")]
    pub id: NotificationId,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: NotificationKind,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Number of unread notifications in a list.
#[must_use]
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}
