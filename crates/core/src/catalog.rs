//! Catalog records and listing filters.
//!
//! Products and categories are copies of backend records. The backend
//! populates `category` on some endpoints and returns a bare id on others,
//! so [`CategoryRef`] accepts both.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CategoryId, Price, ProductId};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Category reference on a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Embedded(Category),
    Id(CategoryId),
}

impl CategoryRef {
    #[must_use]
    pub const fn id(&self) -> &CategoryId {
        match self {
            Self::Embedded(category) => &category.id,
            Self::Id(id) => id,
        }
    }

    /// Category name when the backend embedded it.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Embedded(category) => Some(&category.name),
            Self::Id(_) => None,
        }
    }
}

/// A product as returned by the backend (photo bytes are served separately).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub shipping: Option<bool>,
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    #[must_use]
    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category.as_ref().map(CategoryRef::id)
    }

    /// Description cut to at most `max_chars` characters, with an ellipsis
    /// when anything was dropped.
    #[must_use]
    pub fn excerpt(&self, max_chars: usize) -> String {
        excerpt(&self.description, max_chars)
    }
}

/// Character-safe truncation used by product cards.
#[must_use]
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Preset price bands offered by the home-page price filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub id: u8,
    pub label: &'static str,
    min: u32,
    max: u32,
}

impl PriceRange {
    /// All presets in display order.
    pub const ALL: [Self; 6] = [
        Self::preset(0, "$0 to 19", 0, 19),
        Self::preset(1, "$20 to 39", 20, 39),
        Self::preset(2, "$40 to 59", 40, 59),
        Self::preset(3, "$60 to 79", 60, 79),
        Self::preset(4, "$80 to 99", 80, 99),
        Self::preset(5, "$100 or more", 100, 9999),
    ];

    const fn preset(id: u8, label: &'static str, min: u32, max: u32) -> Self {
        Self {
            id,
            label,
            min,
            max,
        }
    }

    #[must_use]
    pub fn by_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|range| range.id == id)
    }

    /// `[min, max]` as the filter endpoint expects it.
    #[must_use]
    pub const fn bounds(&self) -> [u32; 2] {
        [self.min, self.max]
    }
}

/// Body of `POST /product/product-filters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub checked: Vec<CategoryId>,
    pub radio: Vec<u32>,
}

impl ProductFilter {
    #[must_use]
    pub fn new(categories: Vec<CategoryId>, price_range: Option<PriceRange>) -> Self {
        Self {
            checked: categories,
            radio: price_range.map(|r| r.bounds().to_vec()).unwrap_or_default(),
        }
    }

    /// With no category and no price band the home page falls back to the
    /// paged listing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checked.is_empty() && self.radio.is_empty()
    }
}

/// Back-office product filter: `search` matches name or description
/// (case-insensitive substring), `category` is `"all"` or a category id.
#[must_use]
pub fn filter_products<'a>(
    products: &'a [Product],
    search: &str,
    category: &str,
) -> Vec<&'a Product> {
    let needle = search.trim().to_lowercase();
    products
        .iter()
        .filter(|product| {
            needle.is_empty()
                || product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        })
        .filter(|product| {
            category.is_empty()
                || category == "all"
                || product
                    .category_id()
                    .is_some_and(|id| id.as_str() == category)
        })
        .collect()
}

/// Largest product photo the back office accepts (5 MB).
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Why a product form was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Please fill all required fields")]
    MissingFields,
    #[error("Price must be a non-negative amount (got {0:?})")]
    InvalidPrice(String),
    #[error("Quantity must be a whole number (got {0:?})")]
    InvalidQuantity(String),
}

/// A validated create/update product form, minus the photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub quantity: u32,
    pub category: CategoryId,
    /// `None` when the shipping select was left empty.
    pub shipping: Option<bool>,
}

impl ProductDraft {
    /// Validate raw form values. Name, description, price, quantity and
    /// category are required; shipping is `"1"`/`"0"` or empty.
    ///
    /// # Errors
    ///
    /// Returns `DraftError::MissingFields` when a required value is blank,
    /// otherwise the first price or quantity that fails to parse.
    pub fn parse(
        name: &str,
        description: &str,
        price: &str,
        quantity: &str,
        category: &str,
        shipping: &str,
    ) -> Result<Self, DraftError> {
        let required = [name, description, price, quantity, category];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(DraftError::MissingFields);
        }

        let price = Decimal::from_str(price.trim())
            .ok()
            .filter(|amount| !amount.is_sign_negative())
            .map(Price::new)
            .ok_or_else(|| DraftError::InvalidPrice(price.to_owned()))?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|_| DraftError::InvalidQuantity(quantity.to_owned()))?;
        let shipping = match shipping.trim() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        };

        Ok(Self {
            name: name.trim().to_owned(),
            description: description.trim().to_owned(),
            price,
            quantity,
            category: CategoryId::new(category.trim()),
            shipping,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn product(id: &str, name: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: format!("{name} description"),
            price: Price::from_cents(cents),
            quantity: 10,
            category: Some(CategoryRef::Id(CategoryId::new("c1"))),
            shipping: Some(true),
            created_at: None,
        }
    }

    #[test]
    fn test_product_with_embedded_category() {
        let json = r#"{
            "_id": "p1",
            "name": "Trail Shoe",
            "slug": "trail-shoe",
            "description": "Grippy",
            "price": 89.5,
            "quantity": 0,
            "category": {"_id": "c9", "name": "Shoes", "slug": "shoes"},
            "shipping": true,
            "createdAt": "2024-03-01T10:00:00.000Z"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category_id().unwrap().as_str(), "c9");
        assert_eq!(product.category.as_ref().unwrap().name(), Some("Shoes"));
        assert!(!product.in_stock());
        assert_eq!(product.price, Price::from_cents(8950));
    }

    #[test]
    fn test_product_with_category_id_and_missing_optionals() {
        let json = r#"{"_id": "p2", "name": "Mug", "price": 12, "category": "c1"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category_id().unwrap().as_str(), "c1");
        assert_eq!(product.quantity, 0);
        assert!(product.description.is_empty());
    }

    #[test]
    fn test_excerpt_is_char_safe() {
        assert_eq!(excerpt("héllo wörld", 5), "héllo...");
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("exact", 5), "exact");
    }

    #[test]
    fn test_price_range_bounds() {
        let range = PriceRange::by_id(5).unwrap();
        assert_eq!(range.bounds(), [100, 9999]);
        assert!(PriceRange::by_id(6).is_none());
    }

    #[test]
    fn test_product_filter_body() {
        let filter = ProductFilter::new(vec![CategoryId::new("c1")], PriceRange::by_id(1));
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json["checked"][0], "c1");
        assert_eq!(json["radio"], serde_json::json!([20, 39]));
        assert!(!filter.is_empty());
        assert!(ProductFilter::default().is_empty());
    }

    #[test]
    fn test_filter_products_by_text_and_category() {
        let mut other = product("p3", "Desk Lamp", 2500);
        other.category = Some(CategoryRef::Id(CategoryId::new("c2")));
        let products = vec![
            product("p1", "Red Dress", 4000),
            product("p2", "Blue Dress", 4500),
            other,
        ];

        assert_eq!(filter_products(&products, "dress", "all").len(), 2);
        assert_eq!(filter_products(&products, "LAMP", "").len(), 1);
        assert_eq!(filter_products(&products, "", "c2").len(), 1);
        assert_eq!(filter_products(&products, "dress", "c2").len(), 0);
        // Description matches too
        assert_eq!(filter_products(&products, "lamp description", "all").len(), 1);
    }

    #[test]
    fn test_product_draft_requires_every_field() {
        assert_eq!(
            ProductDraft::parse("Mug", "", "12", "3", "c1", ""),
            Err(DraftError::MissingFields)
        );
        assert_eq!(
            ProductDraft::parse("Mug", "Ceramic", "12", "3", "  ", "1"),
            Err(DraftError::MissingFields)
        );
    }

    #[test]
    fn test_product_draft_parses_values() {
        let draft = ProductDraft::parse(" Mug ", "Ceramic", "12.50", "3", "c1", "1").unwrap();
        assert_eq!(draft.name, "Mug");
        assert_eq!(draft.price, Price::from_cents(1250));
        assert_eq!(draft.quantity, 3);
        assert_eq!(draft.shipping, Some(true));

        let draft = ProductDraft::parse("Mug", "Ceramic", "12", "3", "c1", "").unwrap();
        assert_eq!(draft.shipping, None);
    }

    #[test]
    fn test_product_draft_rejects_bad_numbers() {
        assert!(matches!(
            ProductDraft::parse("Mug", "Ceramic", "-1", "3", "c1", ""),
            Err(DraftError::InvalidPrice(_))
        ));
        assert!(matches!(
            ProductDraft::parse("Mug", "Ceramic", "abc", "3", "c1", ""),
            Err(DraftError::InvalidPrice(_))
        ));
        assert!(matches!(
            ProductDraft::parse("Mug", "Ceramic", "12", "2.5", "c1", ""),
            Err(DraftError::InvalidQuantity(_))
        ));
    }
}
