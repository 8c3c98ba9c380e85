//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request tracing with status and latency)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (in-memory store, signed cookie, `SameSite=Strict`)
//! 6. OTP rate limiting (on `/login/send` and `/login/verify` only)
//!
//! Admin access is checked per handler by the [`RequireAdmin`] extractor.

pub mod admin_session;
pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use admin_session::{AdminSession, SessionStorage, push_flash, take_flashes};
pub use auth::{RequireAdmin, grants_admin};
pub use rate_limit::otp_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::with_session_layer;
