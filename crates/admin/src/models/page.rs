//! Layout data for every admin page.

use crate::error::Result;
use crate::middleware::admin_session::{AdminSession, take_flashes};
use crate::models::Flash;
use crate::routes::notifications::NOTIFICATION_POLL_SECS;

/// Layout context shared by full-page templates.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// Empty on the login and unauthorized pages.
    pub admin_name: String,
    pub flashes: Vec<Flash>,
    pub notification_poll_secs: u64,
}

impl PageContext {
    /// Build the context, consuming queued toasts.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &AdminSession) -> Result<Self> {
        let flashes = take_flashes(&session.session).await?;
        Ok(Self {
            admin_name: session
                .user()
                .map(luxe_core::User::display_name)
                .unwrap_or_default(),
            flashes,
            notification_poll_secs: NOTIFICATION_POLL_SECS,
        })
    }

    /// Add a toast to the page being rendered.
    pub fn push(&mut self, flash: Flash) {
        self.flashes.push(flash);
    }
}
