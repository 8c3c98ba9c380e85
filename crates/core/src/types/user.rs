//! Users, addresses and bans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AddressId, Role, UserId, lenient, nullable};

/// The signed-in visitor as kept in the cart/session store.
///
/// Unknown profile fields sent by the backend are kept in `extra` so that the
/// stored user round-trips without losing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, deserialize_with = "nullable")]
    pub id: UserId,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub roles: Vec<Role>,
    #[serde(default, deserialize_with = "nullable")]
    pub addresses: Vec<Address>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Whether the user carries the `ADMIN` role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// "first last" when either is set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
            .unwrap_or_else(|| self.username.clone())
    }
}

/// Profile fields as returned by `/auth/verify`, `/auth/me` and `/users/me`.
///
/// Every field is optional; the store fills the gaps when building a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Geographic point picked on the address map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// A shipping address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AddressId>,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub location: Location,
    #[serde(default, deserialize_with = "nullable")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub city_id: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub address: String,
}

/// A user row in the admin user lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "nullable")]
    pub id: UserId,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(default, deserialize_with = "nullable")]
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub roles: Vec<Role>,
    #[serde(default, deserialize_with = "nullable")]
    pub banned: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    /// "first last", else the username, else the phone.
    #[must_use]
    pub fn display_name(&self) -> String {
        full_name(self.first_name.as_deref(), self.last_name.as_deref())
            .or_else(|| (!self.username.is_empty()).then(|| self.username.clone()))
            .unwrap_or_else(|| self.phone.clone())
    }
}

/// An entry of `/users/banned`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ban {
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    /// Populated user document; ids and other shapes are dropped.
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<UserRecord>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

pub(crate) fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let name = format!("{} {}", first.unwrap_or(""), last.unwrap_or(""))
        .trim()
        .to_owned();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_keeps_unknown_fields() {
        let raw = json!({
            "_id": "u1",
            "phone": "09120000000",
            "username": "sara",
            "roles": ["USER"],
            "addresses": [],
            "avatar": "me.png"
        });
        let user: User = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.extra.get("avatar"), Some(&json!("me.png")));
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn test_user_tolerates_nulls() {
        let user: User =
            serde_json::from_value(json!({"_id": null, "phone": "1", "roles": null})).unwrap();
        assert!(user.id.is_empty());
        assert!(user.roles.is_empty());
        assert!(user.addresses.is_empty());
    }

    #[test]
    fn test_display_names() {
        let mut record = UserRecord {
            phone: "0912".into(),
            ..UserRecord::default()
        };
        assert_eq!(record.display_name(), "0912");
        record.username = "ali".into();
        assert_eq!(record.display_name(), "ali");
        record.last_name = Some("Rahimi".into());
        assert_eq!(record.display_name(), "Rahimi");
    }

    #[test]
    fn test_ban_with_unpopulated_user() {
        let ban: Ban = serde_json::from_value(json!({"phone": "0912", "user": "abc"})).unwrap();
        assert!(ban.user.is_none());
        let ban: Ban =
            serde_json::from_value(json!({"phone": "0912", "user": {"_id": "abc", "phone": "0912"}}))
                .unwrap();
        assert_eq!(ban.user.unwrap().id.as_str(), "abc");
    }

    #[test]
    fn test_address_wire_format() {
        let address = Address {
            id: None,
            name: "خانه".into(),
            location: Location { lat: 35.7, lng: 51.4 },
            postal_code: "1234567890".into(),
            city_id: 1,
            address: "تهران".into(),
        };
        assert_eq!(
            serde_json::to_value(&address).unwrap(),
            json!({
                "name": "خانه",
                "location": {"lat": 35.7, "lng": 51.4},
                "postalCode": "1234567890",
                "cityId": 1,
                "address": "تهران"
            })
        );
    }
}
