//! The caller's saved addresses.

use luxe_core::{Address, AddressId, ProfilePayload};
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use crate::client::{API_V1, Api, segment};
use crate::{Ack, ApiError, Envelope, Page};

/// Payload of address mutations: the updated owner.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressResult {
    #[serde(default)]
    pub user: Option<ProfilePayload>,
}

impl AddressResult {
    /// The most recently added address, as stored by the backend.
    #[must_use]
    pub fn newest_address(&self) -> Option<&Address> {
        self.user.as_ref()?.addresses.as_ref()?.last()
    }
}

impl Api<'_> {
    /// # Errors
    ///
    /// Returns error if the request fails or the response has an unexpected shape.
    #[instrument(skip(self, address), fields(name = %address.name))]
    pub async fn create_address(&self, address: &Address) -> Result<Envelope<AddressResult>, ApiError> {
        self.request(
            Method::POST,
            &format!("{API_V1}/users/me/addresses"),
            Some(serde_json::to_value(address)?),
        )
        .await?
        .decode()
    }

    /// # Errors
    ///
    /// Returns error if the request fails or the list has an unexpected shape.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self) -> Result<Envelope<Page<Address>>, ApiError> {
        self.request(Method::GET, &format!("{API_V1}/users/me/addresses"), None)
            .await?
            .map(|data| Page::from_data(data, "addresses", &[]))
    }

    /// # Errors
    ///
    /// Returns error if the request fails or the response has an unexpected shape.
    #[instrument(skip(self, address))]
    pub async fn update_address(
        &self,
        id: &AddressId,
        address: &Address,
    ) -> Result<Envelope<AddressResult>, ApiError> {
        self.request(
            Method::PATCH,
            &format!("{API_V1}/users/me/addresses/{}", segment(id.as_str())),
            Some(serde_json::to_value(address)?),
        )
        .await?
        .decode()
    }

    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_address(&self, id: &AddressId) -> Result<Ack, ApiError> {
        self.request(
            Method::DELETE,
            &format!("{API_V1}/users/me/addresses/{}", segment(id.as_str())),
            None,
        )
        .await
    }
}
