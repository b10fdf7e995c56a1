//! Status and role enums shared by the storefront and the admin console.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Order fulfillment status.
///
/// The serialized spellings are the backend's wire values, including its
/// `deliverd` and `cancel` spellings; changing them would break
/// `PUT /auth/order-status/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String")]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Not Process")]
    NotProcessed,
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Shipped")]
    Shipped,
    #[serde(rename = "deliverd")]
    Delivered,
    #[serde(rename = "cancel")]
    Cancelled,
}

impl OrderStatus {
    /// All statuses in the order the admin status picker lists them.
    pub const ALL: [Self; 5] = [
        Self::NotProcessed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The backend's wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotProcessed => "Not Process",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "deliverd",
            Self::Cancelled => "cancel",
        }
    }

    /// CSS modifier used for the status badge colour.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::NotProcessed => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Case-insensitive comparison against a filter value such as `"shipped"`.
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(filter.trim())
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.matches(s))
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Account role.
///
/// The backend stores the role as an integer (`1` for administrators, `0`
/// otherwise) but some endpoints render it as `"admin"`/`"user"`; both forms
/// deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Label shown in role badges.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" | "1" => Ok(Self::Admin),
            "user" | "0" => Ok(Self::User),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(self.is_admin()))
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Number(i64),
            Text(String),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Number(1) => Ok(Self::Admin),
            Wire::Number(_) => Ok(Self::User),
            Wire::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_spellings() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::NotProcessed).unwrap(),
            "\"Not Process\""
        );
        assert_eq!(
            serde_json::to_string(&OrderStatus::Delivered).unwrap(),
            "\"deliverd\""
        );
        let status: OrderStatus = serde_json::from_str("\"cancel\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_order_status_parse_is_case_insensitive() {
        assert_eq!("shipped".parse::<OrderStatus>(), Ok(OrderStatus::Shipped));
        assert_eq!(
            "NOT PROCESS".parse::<OrderStatus>(),
            Ok(OrderStatus::NotProcessed)
        );
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_rejects_unknown_wire_value() {
        assert!(serde_json::from_str::<OrderStatus>("\"Refunded\"").is_err());
    }

    #[test]
    fn test_role_accepts_numbers_and_strings() {
        assert_eq!(serde_json::from_str::<Role>("1").unwrap(), Role::Admin);
        assert_eq!(serde_json::from_str::<Role>("0").unwrap(), Role::User);
        assert_eq!(serde_json::from_str::<Role>("\"admin\"").unwrap(), Role::Admin);
        assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::User);
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
    }

    #[test]
    fn test_role_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "0");
    }
}
