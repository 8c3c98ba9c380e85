//! Storefront models kept in the visitor session.

pub mod page;
pub mod session;

pub use page::PageContext;
pub use session::{Flash, FlashKind, keys as session_keys};
