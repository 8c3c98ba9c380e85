use luxe_core::validation::ContactMessage;
use reqwest::Method;
use tracing::instrument;

use crate::client::{API_V1, Api};
use crate::{Ack, ApiError};

impl Api<'_> {
    /// Post a message from the contact form.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self, message), fields(name = %message.name))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<Ack, ApiError> {
        self.request(
            Method::POST,
            &format!("{API_V1}/contact"),
            Some(serde_json::to_value(message)?),
        )
        .await
    }
}
