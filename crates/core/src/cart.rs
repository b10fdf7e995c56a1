//! Shopping cart state.
//!
//! The cart is an ordered list of product snapshots with a quantity each. The
//! storefront keeps one `Cart` per session and writes it back after every
//! mutation, so the rules here are the whole contract:
//!
//! - adding a product that is already in the cart increments its quantity
//! - a line's quantity never drops below 1 (removal is a separate operation)
//! - totals are a linear scan of `price x quantity`
//!
//! ```
//! use bazaar_core::cart::{AddOutcome, Cart, CartItem};
//! use bazaar_core::{Price, ProductId};
//!
//! let mug = CartItem::new(ProductId::new("p1"), "Mug", Price::from_cents(1250));
//! let mut cart = Cart::default();
//! assert_eq!(cart.add(mug.clone(), 1), AddOutcome::Added);
//! assert_eq!(cart.add(mug, 2), AddOutcome::Incremented);
//! assert_eq!(cart.subtotal(), Price::from_cents(3750));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CategoryRef, Product};
use crate::types::{CategoryId, Price, ProductId};

/// Sales tax shown on the cart summary (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Requested quantity is below 1.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(i64),

    /// No line for this product.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// Result of [`Cart::add`], used to pick the confirmation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Incremented,
}

/// A product snapshot in the cart.
///
/// Serialized with the backend's field names because the whole cart is
/// posted to the payment endpoint as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub quantity: u32,
}

impl CartItem {
    /// A line with quantity 1 and no slug, description or category.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            slug: String::new(),
            description: String::new(),
            price,
            category: None,
            quantity: 1,
        }
    }

    /// `price x quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price,
            category: product.category.as_ref().map(|c| CategoryRef::id(c).clone()),
            quantity: 1,
        }
    }
}

/// The shopper's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines (the "N items in your cart" figure).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Add `quantity` of a product. An existing line for the same product id
    /// is incremented instead of duplicated; the snapshot already in the cart
    /// is kept. A quantity of 0 counts as 1.
    pub fn add(&mut self, item: CartItem, quantity: u32) -> AddOutcome {
        let quantity = quantity.max(1);
        if let Some(existing) = self.items.iter_mut().find(|line| line.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return AddOutcome::Incremented;
        }

        self.items.push(CartItem { quantity, ..item });
        AddOutcome::Added
    }

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for anything below 1 (the cart is
    /// left unchanged) and `CartError::NotInCart` for an unknown product.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<u32, CartError> {
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(CartError::InvalidQuantity(quantity))?;

        let line = self
            .items
            .iter_mut()
            .find(|line| &line.id == id)
            .ok_or_else(|| CartError::NotInCart(id.clone()))?;
        line.quantity = quantity;
        Ok(quantity)
    }

    /// Increase a line by one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` for an unknown product.
    pub fn increment(&mut self, id: &ProductId) -> Result<u32, CartError> {
        let current = self.quantity_of(id)?;
        self.set_quantity(id, i64::from(current) + 1)
    }

    /// Decrease a line by one. At quantity 1 this is rejected rather than
    /// removing the line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` at quantity 1 and
    /// `CartError::NotInCart` for an unknown product.
    pub fn decrement(&mut self, id: &ProductId) -> Result<u32, CartError> {
        let current = self.quantity_of(id)?;
        self.set_quantity(id, i64::from(current) - 1)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` for an unknown product.
    pub fn remove(&mut self, id: &ProductId) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|line| &line.id == id)
            .ok_or_else(|| CartError::NotInCart(id.clone()))?;
        Ok(self.items.remove(index))
    }

    /// Empty the cart. Only called once payment has succeeded.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price x quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Tax on the subtotal at [`TAX_RATE`], rounded to cents.
    #[must_use]
    pub fn tax(&self) -> Price {
        self.subtotal().percent(TAX_RATE)
    }

    /// The amount labelled "Total" on the cart page.
    ///
    /// Tax is displayed as its own line but not added here; the payment
    /// gateway charges the sum of line prices.
    #[must_use]
    pub fn total(&self) -> Price {
        self.subtotal()
    }

    /// Subtotal plus tax.
    #[must_use]
    pub fn total_with_tax(&self) -> Price {
        self.subtotal() + self.tax()
    }

    fn quantity_of(&self, id: &ProductId) -> Result<u32, CartError> {
        self.get(id)
            .map(|line| line.quantity)
            .ok_or_else(|| CartError::NotInCart(id.clone()))
    }
}
