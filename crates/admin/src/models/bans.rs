//! Ban list rows, enriched with the banned user's account.

use chrono::{DateTime, Utc};
use luxe_core::types::price::persian_digits;
use luxe_core::{Ban, UserRecord};

/// Users fetched per ban when looking up the account behind a phone.
pub const BAN_LOOKUP_LIMIT: u32 = 100;

/// The account a phone search returned for a ban: the exact phone match,
/// else the first result.
#[must_use]
pub fn match_user<'a>(phone: &str, candidates: &'a [UserRecord]) -> Option<&'a UserRecord> {
    candidates
        .iter()
        .find(|u| u.phone == phone)
        .or_else(|| candidates.first())
}

/// One row of the ban table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRow {
    /// Empty when no account was found; the row then cannot be unbanned.
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub reason: String,
    pub date: String,
}

impl BanRow {
    #[must_use]
    pub fn new(ban: &Ban, user: Option<&UserRecord>) -> Self {
        let phone = if ban.phone.is_empty() {
            user.map(|u| u.phone.clone()).unwrap_or_default()
        } else {
            ban.phone.clone()
        };
        Self {
            user_id: user.map(|u| u.id.to_string()).unwrap_or_default(),
            name: user.map(UserRecord::display_name).unwrap_or_default(),
            phone: persian_digits(&phone),
            reason: ban.reason.clone().unwrap_or_default(),
            date: display_date(ban.created_at),
        }
    }

    #[must_use]
    pub fn can_unban(&self) -> bool {
        !self.user_id.is_empty()
    }
}

/// `yyyy/mm/dd` with Persian digits, or empty.
#[must_use]
pub fn display_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| persian_digits(&d.format("%Y/%m/%d").to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use luxe_core::UserId;

    use super::*;

    fn record(id: &str, phone: &str) -> UserRecord {
        UserRecord {
            id: UserId::new(id),
            phone: phone.to_string(),
            username: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_phone_match_wins() {
        let candidates = vec![record("a", "09120000001"), record("b", "09120000002")];
        let user = match_user("09120000002", &candidates).unwrap();
        assert_eq!(user.id.as_str(), "b");
    }

    #[test]
    fn test_falls_back_to_first_result() {
        let candidates = vec![record("a", "09120000001"), record("b", "09120000002")];
        let user = match_user("09129999999", &candidates).unwrap();
        assert_eq!(user.id.as_str(), "a");
        assert!(match_user("09129999999", &[]).is_none());
    }

    #[test]
    fn test_row_without_account() {
        let ban = Ban {
            phone: "09121234567".to_string(),
            ..Default::default()
        };
        let row = BanRow::new(&ban, None);
        assert_eq!(row.phone, "۰۹۱۲۱۲۳۴۵۶۷");
        assert!(!row.can_unban());
        assert!(row.date.is_empty());
    }

    #[test]
    fn test_row_takes_phone_from_account() {
        let user = record("u1", "09120000001");
        let row = BanRow::new(&Ban::default(), Some(&user));
        assert_eq!(row.user_id, "u1");
        assert_eq!(row.name, "u1");
        assert_eq!(row.phone, "۰۹۱۲۰۰۰۰۰۰۱");
        assert!(row.can_unban());
    }
}
