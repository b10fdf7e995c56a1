//! Users, orders and the back-office list filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{OrderId, OrderStatus, Price, Role, UserId};

/// A shopper or administrator account as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Checkout ships to the profile address, so it must be set.
    #[must_use]
    pub fn has_address(&self) -> bool {
        !self.address.trim().is_empty()
    }
}

/// Buyer summary embedded in an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default, rename = "_id")]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub payment: serde_json::Value,
    #[serde(default)]
    pub buyer: Buyer,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, rename = "createAt", alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Sum of the product prices on the order.
    ///
    /// Orders store one product snapshot per purchased line without a
    /// quantity, so each snapshot counts once.
    #[must_use]
    pub fn total(&self) -> Price {
        self.products.iter().map(|product| product.price).sum()
    }

    /// Whether the payment gateway reported success.
    #[must_use]
    pub fn payment_succeeded(&self) -> bool {
        self.payment
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// Revenue across a set of orders.
#[must_use]
pub fn revenue<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Price {
    orders.into_iter().map(Order::total).sum()
}

/// Back-office order filter: `search` matches the buyer name or the order id
/// (case-insensitive substring); `status` is `"all"` or a status spelling
/// compared case-insensitively.
#[must_use]
pub fn filter_orders<'a>(orders: &'a [Order], search: &str, status: &str) -> Vec<&'a Order> {
    let needle = search.trim().to_lowercase();
    orders
        .iter()
        .filter(|order| {
            needle.is_empty()
                || order.buyer.name.to_lowercase().contains(&needle)
                || order.id.as_str().to_lowercase().contains(&needle)
        })
        .filter(|order| status.is_empty() || status == "all" || order.status.matches(status))
        .collect()
}

/// Back-office user filter: `search` matches name, email or phone
/// (case-insensitive substring); `role` is `"all"`, `"admin"` or `"user"`.
#[must_use]
pub fn filter_users<'a>(users: &'a [User], search: &str, role: &str) -> Vec<&'a User> {
    let needle = search.trim().to_lowercase();
    let role: Option<Role> = role.parse().ok();
    users
        .iter()
        .filter(|user| {
            needle.is_empty()
                || user.name.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
                || user.phone.to_lowercase().contains(&needle)
        })
        .filter(|user| role.is_none_or(|role| user.role == role))
        .collect()
}

/// Header counts on the users page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub verified: usize,
}

impl UserStats {
    #[must_use]
    pub fn from_users(users: &[User]) -> Self {
        Self {
            total: users.len(),
            admins: users.iter().filter(|u| u.is_admin()).count(),
            verified: users.iter().filter(|u| u.verified).count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;

    fn user(id: &str, name: &str, role: Role, verified: bool) -> User {
        User {
            id: UserId::new(id),
            name: name.to_string(),
            email: format!("{}@shop.test", name.to_lowercase()),
            phone: "555-0100".to_string(),
            address: String::new(),
            role,
            verified,
            created_at: None,
            updated_at: None,
        }
    }

    fn order(id: &str, buyer: &str, status: OrderStatus, cents: &[i64]) -> Order {
        Order {
            id: OrderId::new(id),
            products: cents
                .iter()
                .enumerate()
                .map(|(i, c)| product(&format!("p{i}"), "Item", *c))
                .collect(),
            payment: serde_json::json!({"success": true}),
            buyer: Buyer {
                id: None,
                name: buyer.to_string(),
            },
            status,
            created_at: None,
        }
    }

    #[test]
    fn test_order_wire_format() {
        let json = r#"{
            "_id": "66aa00bb11cc22dd33ee44ff",
            "products": [{"_id": "p1", "name": "Mug", "price": 12.5}],
            "payment": {"success": true},
            "buyer": {"_id": "u1", "name": "Ada"},
            "status": "deliverd",
            "createAt": "2024-05-01T08:30:00Z"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.buyer.name, "Ada");
        assert!(order.payment_succeeded());
        assert!(order.created_at.is_some());
        assert_eq!(order.total(), Price::from_cents(1250));
    }

    #[test]
    fn test_order_total_and_revenue() {
        let orders = vec![
            order("o1", "Ada", OrderStatus::Shipped, &[1000, 250]),
            order("o2", "Grace", OrderStatus::Processing, &[999]),
        ];
        assert_eq!(orders[0].total(), Price::from_cents(1250));
        assert_eq!(revenue(&orders), Price::from_cents(2249));
        assert_eq!(revenue(&Vec::<Order>::new()), Price::ZERO);
    }

    #[test]
    fn test_filter_orders() {
        let orders = vec![
            order("aaa111", "Ada Lovelace", OrderStatus::Shipped, &[100]),
            order("bbb222", "Grace Hopper", OrderStatus::Cancelled, &[100]),
        ];
        assert_eq!(filter_orders(&orders, "ada", "all").len(), 1);
        assert_eq!(filter_orders(&orders, "B222", "all").len(), 1);
        assert_eq!(filter_orders(&orders, "", "CANCEL").len(), 1);
        assert_eq!(filter_orders(&orders, "ada", "cancel").len(), 0);
        assert_eq!(filter_orders(&orders, "", "").len(), 2);
    }

    #[test]
    fn test_filter_users_and_stats() {
        let users = vec![
            user("u1", "Ada", Role::Admin, true),
            user("u2", "Grace", Role::User, true),
            user("u3", "Linus", Role::User, false),
        ];
        assert_eq!(filter_users(&users, "grace@", "all").len(), 1);
        assert_eq!(filter_users(&users, "555", "user").len(), 2);
        assert_eq!(filter_users(&users, "", "admin").len(), 1);

        let stats = UserStats::from_users(&users);
        assert_eq!(
            stats,
            UserStats {
                total: 3,
                admins: 1,
                verified: 2
            }
        );
    }

    #[test]
    fn test_has_address() {
        let mut shopper = user("u1", "Ada", Role::User, true);
        assert!(!shopper.has_address());
        shopper.address = "1 Analytical Way".to_string();
        assert!(shopper.has_address());
    }
}
