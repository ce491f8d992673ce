//! Cart line items and the in-memory cart model.
//!
//! [`Cart`] is plain data: an ordered list of line items with unique ids.
//! The operations here are pure; [`crate::store::CartStore`] wraps them with
//! load and save.

use mystore_core::{ProductId, parse_price_text};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tracing::warn;

use crate::api::Product;
use crate::error::CartError;

/// Largest accepted unit price.
///
/// Keeps `unit_price × u32::MAX` and any realistic subtotal inside `Decimal`.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// One product entry in the cart.
///
/// Field names on the wire match the storefront's historical storage layout
/// (`price`, `imageSrc`), so carts saved by earlier versions load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product id; unique within a cart.
    pub id: ProductId,
    /// Display name captured when the item was first added.
    pub name: String,
    /// Unit price captured when the item was first added.
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Number of units, at least 1.
    pub quantity: u32,
    /// Image reference (URL or file name).
    #[serde(rename = "imageSrc", default)]
    pub image: String,
}

impl LineItem {
    /// Create a line item. Call [`LineItem::validate`] before adding it.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
            image: image.into(),
        }
    }

    /// Build a line item from the price text shown on a product card
    /// (e.g., `"$12.50"`).
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if the price text is not a number.
    pub fn from_display(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price_text: &str,
        quantity: u32,
        image: impl Into<String>,
    ) -> Result<Self, CartError> {
        let unit_price =
            parse_price_text(price_text).map_err(|e| CartError::Validation(e.to_string()))?;
        Ok(Self::new(id, name, unit_price, quantity, image))
    }

    /// Build a line item from a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if the product is out of stock or
    /// `quantity` exceeds the available stock.
    pub fn from_product(product: &Product, quantity: u32) -> Result<Self, CartError> {
        if product.stock <= 0 {
            return Err(CartError::Validation(format!(
                "{} is out of stock",
                product.name
            )));
        }
        if i64::from(quantity) > product.stock {
            return Err(CartError::Validation(format!(
                "only {} of {} in stock",
                product.stock, product.name
            )));
        }
        Ok(Self::new(
            product.id.clone(),
            product.name.clone(),
            product.price,
            quantity,
            product.image.clone(),
        ))
    }

    /// Check the line-item invariants.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` for a blank id, a unit price outside
    /// `0..=MAX_UNIT_PRICE`, or a zero quantity.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.id.is_blank() {
            return Err(CartError::Validation("id cannot be empty".to_string()));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(CartError::Validation(format!(
                "unit price cannot be negative (got {})",
                self.unit_price
            )));
        }
        if self.unit_price > MAX_UNIT_PRICE {
            return Err(CartError::Validation(format!(
                "unit price cannot exceed {MAX_UNIT_PRICE} (got {})",
                self.unit_price
            )));
        }
        if self.quantity < 1 {
            return Err(CartError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `unit_price × quantity`, unrounded.
    ///
    /// Saturates at `Decimal::MAX` for an item that never passed
    /// [`LineItem::validate`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}

/// Ordered sequence of line items; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total number of units across all line items (the header badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    /// Look up a line item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id.as_str() == id)
    }

    /// Add `candidate`, merging by id.
    ///
    /// An existing line item keeps its captured name, price and image and has
    /// its quantity increased; otherwise the candidate is appended.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` if the candidate is malformed; the
    /// cart is unchanged in that case.
    pub fn add(&mut self, candidate: LineItem) -> Result<(), CartError> {
        candidate.validate()?;
        match self.items.iter_mut().find(|item| item.id == candidate.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(candidate.quantity);
            }
            None => self.items.push(candidate),
        }
        Ok(())
    }

    /// Set the quantity of line item `id`, clamped to at least 1.
    ///
    /// Returns `false` if no line item has that id.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> bool {
        let clamped = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);
        match self.items.iter_mut().find(|item| item.id.as_str() == id) {
            Some(item) => {
                item.quantity = clamped;
                true
            }
            None => false,
        }
    }

    /// Remove line item `id`. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id.as_str() != id);
        self.items.len() != before
    }

    /// Repair a cart read from storage: zero quantities become 1, items that
    /// fail [`LineItem::validate`] are dropped and duplicate ids are merged
    /// into their first occurrence.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut cart = Self::new();
        for mut item in self.items {
            item.quantity = item.quantity.max(1);
            if let Err(e) = item.validate() {
                warn!(id = %item.id, error = %e, "Dropping invalid stored line item");
                continue;
            }
            match cart.items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }
}

impl Cart {
    /// Take the lines of a submitted order out of this cart.
    ///
    /// Each ordered quantity is subtracted from the line with the same id;
    /// lines that reach zero are removed. Anything added after `ordered` was
    /// captured stays in the cart.
    pub fn remove_ordered(&mut self, ordered: &Self) {
        for line in &ordered.items {
            if let Some(existing) = self.items.iter_mut().find(|item| item.id == line.id) {
                existing.quantity = existing.quantity.saturating_sub(line.quantity);
            }
        }
        self.items.retain(|item| item.quantity > 0);
    }
}

impl FromIterator<LineItem> for Cart {
    fn from_iter<T: IntoIterator<Item = LineItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
        .normalized()
    }
}
