//! User statistics for the reports page.

use chrono::{DateTime, TimeDelta, Utc};
use luxe_core::UserRecord;
use luxe_core::types::price::persian_digits;

/// Users registered within this many days count as new.
pub const NEW_USER_DAYS: i64 = 7;

/// Upper bound on users fetched for the statistics.
pub const REPORT_USER_LIMIT: u32 = 1000;

/// Counts behind the report cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub banned: usize,
    pub new_users: usize,
}

impl UserStats {
    /// Compute statistics from the fetched users and the ban list size.
    ///
    /// `banned` comes from the ban list, not from the users' `banned` flags,
    /// so it can disagree with `total - active`.
    #[must_use]
    pub fn compute(users: &[UserRecord], banned: usize, now: DateTime<Utc>) -> Self {
        let cutoff = now - TimeDelta::days(NEW_USER_DAYS);
        Self {
            total: users.len(),
            active: users.iter().filter(|u| !u.banned).count(),
            banned,
            new_users: users
                .iter()
                .filter(|u| u.created_at.is_some_and(|created| created > cutoff))
                .count(),
        }
    }

    /// `part` as a percentage of all users; zero when there are none.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn share(&self, part: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        part as f64 / self.total as f64 * 100.0
    }

    /// The four cards, in display order.
    #[must_use]
    pub fn cards(&self) -> Vec<ReportCard> {
        let growth = self.share(self.new_users);
        vec![
            ReportCard::new("کل کاربران", self.total, growth, growth > 0.0, "blue", "👥"),
            ReportCard::new(
                "کاربران فعال",
                self.active,
                self.share(self.active),
                true,
                "green",
                "✅",
            ),
            ReportCard::new(
                "کاربران بن شده",
                self.banned,
                self.share(self.banned),
                self.banned == 0,
                "red",
                "🛡",
            ),
            ReportCard::new("کاربران جدید", self.new_users, growth, true, "orange", "📈"),
        ]
    }
}

/// One statistic card.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportCard {
    pub title: &'static str,
    pub value: String,
    /// Percentage with one decimal, e.g. `۳۳.۳٪`.
    pub change: String,
    pub positive: bool,
    pub tone: &'static str,
    pub icon: &'static str,
}

impl ReportCard {
    fn new(
        title: &'static str,
        value: usize,
        change: f64,
        positive: bool,
        tone: &'static str,
        icon: &'static str,
    ) -> Self {
        Self {
            title,
            value: persian_digits(&value.to_string()),
            change: format!("{}٪", persian_digits(&format!("{change:.1}"))),
            positive,
            tone,
            icon,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    fn user(days_ago: Option<i64>, banned: bool) -> UserRecord {
        UserRecord {
            banned,
            created_at: days_ago.map(|d| now() - TimeDelta::days(d)),
            ..Default::default()
        }
    }

    #[test]
    fn test_compute_counts() {
        let users = vec![
            user(Some(1), false),
            user(Some(6), true),
            user(Some(8), false),
            user(None, false),
        ];
        let stats = UserStats::compute(&users, 1, now());

        assert_eq!(
            stats,
            UserStats {
                total: 4,
                active: 3,
                banned: 1,
                new_users: 2,
            }
        );
        assert!((stats.share(stats.active) - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_users_has_zero_shares() {
        let stats = UserStats::compute(&[], 2, now());
        assert!(stats.share(stats.banned).abs() < f64::EPSILON);

        let cards = stats.cards();
        assert_eq!(cards[2].value, "۲");
        assert_eq!(cards[2].change, "۰.۰٪");
        assert!(!cards[2].positive);
    }

    #[test]
    fn test_cards_order_and_format() {
        let users = vec![user(Some(1), false), user(Some(30), false), user(Some(40), false)];
        let cards = UserStats::compute(&users, 0, now()).cards();

        let titles: Vec<&str> = cards.iter().map(|c| c.title).collect();
        assert_eq!(
            titles,
            vec!["کل کاربران", "کاربران فعال", "کاربران بن شده", "کاربران جدید"]
        );
        assert_eq!(cards[0].value, "۳");
        assert_eq!(cards[0].change, "۳۳.۳٪");
        assert_eq!(cards[1].change, "۱۰۰.۰٪");
        assert!(cards[2].positive);
    }
}
