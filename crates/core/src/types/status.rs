//! Status and role enums shared by the storefront and the admin.

use serde::{Deserialize, Serialize};

/// Moderation status of a comment or reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    /// Persian label shown in the admin.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "در انتظار",
            Self::Approved => "تایید شده",
            Self::Rejected => "رد شده",
        }
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid comment status: {s}")),
        }
    }
}

/// Account role as sent by the backend (`"USER"`, `"ADMIN"`, ...).
///
/// Unknown roles are preserved verbatim so a profile round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Admin,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::Other(role) => role,
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        match role.as_str() {
            "USER" => Self::User,
            "ADMIN" => Self::Admin,
            _ => Self::Other(role),
        }
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        Self::from(role.to_owned())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            known => known.as_str().to_owned(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_status_wire_format() {
        assert_eq!(serde_json::to_string(&CommentStatus::Approved).unwrap(), "\"approved\"");
        let status: CommentStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, CommentStatus::Rejected);
        assert_eq!("pending".parse::<CommentStatus>().unwrap(), CommentStatus::Pending);
        assert!("deleted".parse::<CommentStatus>().is_err());
    }

    #[test]
    fn test_role_keeps_unknown_values() {
        let roles: Vec<Role> = serde_json::from_str(r#"["USER","ADMIN","SELLER"]"#).unwrap();
        assert_eq!(roles, vec![Role::User, Role::Admin, Role::Other("SELLER".into())]);
        assert_eq!(
            serde_json::to_string(&roles).unwrap(),
            r#"["USER","ADMIN","SELLER"]"#
        );
    }
}
