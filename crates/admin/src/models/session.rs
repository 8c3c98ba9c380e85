//! Session-related types for the admin panel.
//!
//! The signed-in admin and their bearer token live under the cart store's
//! keys (see [`luxe_core::store::keys`]), exactly as on the storefront.

use serde::{Deserialize, Serialize};

/// Session keys for page state.
pub mod keys {
    /// Phone number waiting for its OTP.
    pub const PENDING_PHONE: &str = "pending_phone";

    /// Time of the last create submission (product, collection).
    pub const LAST_SUBMIT: &str = "last_submit";

    /// Queued toast messages.
    pub const FLASH: &str = "flash";
}

/// Toast colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "toast-success",
            Self::Error => "toast-error",
            Self::Info => "toast-info",
        }
    }
}

/// A toast shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Info,
            message: message.into(),
        }
    }
}
