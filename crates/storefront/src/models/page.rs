//! Data every page layout renders: header badge, account menu and toasts.

use crate::error::Result;
use crate::middleware::visitor::{Visitor, take_flashes};
use crate::models::Flash;

/// Layout context shared by all full-page templates.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub signed_in: bool,
    pub is_admin: bool,
    pub user_name: String,
    pub cart_count: u32,
    pub flashes: Vec<Flash>,
}

impl PageContext {
    /// Build the context for `visitor`, consuming their queued toasts.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(visitor: &Visitor) -> Result<Self> {
        let flashes = take_flashes(&visitor.session).await?;
        let user = visitor.user();

        Ok(Self {
            signed_in: user.is_some(),
            is_admin: user.is_some_and(luxe_core::User::is_admin),
            user_name: user.map(luxe_core::User::display_name).unwrap_or_default(),
            cart_count: visitor.store.item_count(),
            flashes,
        })
    }

    /// Add a toast to the page being rendered.
    pub fn push(&mut self, flash: Flash) {
        self.flashes.push(flash);
    }
}
