//! Phone/OTP authentication.

use luxe_core::ProfilePayload;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::client::{API_V1, Api};
use crate::{Ack, ApiError, Envelope};

/// Payload of `POST /auth/verify`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyData {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<ProfilePayload>,
}

/// Payload of `GET /auth/me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub user: Option<ProfilePayload>,
}

impl Api<'_> {
    /// Ask the backend to text a one-time code to `phone`.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the phone.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, phone: &str) -> Result<Ack, ApiError> {
        self.request(
            Method::POST,
            &format!("{API_V1}/auth/send"),
            Some(json!({ "phone": phone })),
        )
        .await
    }

    /// Exchange a one-time code for a bearer token and profile.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response has an unexpected shape.
    #[instrument(skip(self, otp))]
    pub async fn verify_otp(&self, phone: &str, otp: &str) -> Result<Envelope<VerifyData>, ApiError> {
        self.request(
            Method::POST,
            &format!("{API_V1}/auth/verify"),
            Some(json!({ "phone": phone, "otp": otp })),
        )
        .await?
        .decode()
    }

    /// Profile of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the token is not accepted.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<Envelope<ProfileData>, ApiError> {
        self.request(Method::GET, &format!("{API_V1}/auth/me"), None)
            .await?
            .decode()
    }
}
