//! Luxe backend client.
//!
//! A thin wrapper over the REST backend (`/api/v1`). Every call goes through
//! one request path that:
//!
//! - attaches `Authorization: Bearer <token>` when the visitor has a token
//! - sends JSON bodies (multipart for product uploads)
//! - reads the body as text and parses it as JSON, wrapping non-JSON bodies
//!   as `{"message": <text>}`
//! - maps non-2xx responses to [`ApiError`] using the server's `error` or
//!   `message` field, with 429 reported as [`ApiError::RateLimited`]
//!
//! There is no retry and no circuit breaking.
//!
//! # Example
//!
//! ```rust,ignore
//! use luxe_client::{ApiClient, ApiConfig, ProductQuery};
//!
//! let client = ApiClient::new(&ApiConfig::new("https://backend.example.com"))?;
//! let page = client
//!     .anonymous()
//!     .list_products(&ProductQuery { featured: Some(true), limit: Some(4), ..Default::default() })
//!     .await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod endpoints;
mod envelope;
mod error;
pub mod images;

pub use client::{Api, ApiClient, ApiConfig, DEFAULT_BASE_URL};
pub use endpoints::addresses::AddressResult;
pub use endpoints::auth::{ProfileData, VerifyData};
pub use endpoints::collections::CollectionQuery;
pub use endpoints::comments::NewComment;
pub use endpoints::products::{ImageUpload, ProductQuery, ProductUpload};
pub use endpoints::users::{ProfileUpdate, UserQuery};
pub use envelope::{Ack, Envelope, Page, Pagination};
pub use error::{ApiError, GENERIC_FAILURE, RATE_LIMIT_NOTICE};
