//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (in-memory store, signed cookie)
//! 6. OTP rate limiting (on `/register/send` and `/register/verify` only)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod visitor;

pub use auth::{LOGIN_FIRST, RequireUser};
pub use rate_limit::otp_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::with_session_layer;
pub use visitor::{SessionStorage, Visitor, push_flash, take_flashes};
