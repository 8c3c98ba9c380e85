//! Admin view models and session types.

pub mod bans;
pub mod page;
pub mod reports;
pub mod session;

pub use bans::{BanRow, match_user};
pub use page::PageContext;
pub use reports::{ReportCard, UserStats};
pub use session::{Flash, FlashKind, keys as session_keys};
