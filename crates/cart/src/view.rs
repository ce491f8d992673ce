//! Render-ready cart view model.
//!
//! Front ends draw the cart from these values; they never compute money or
//! touch storage themselves.

use mystore_core::format_price;
use serde::Serialize;

use crate::cart::{Cart, LineItem};
use crate::totals::Pricing;

/// Checkout button label when the cart has items.
pub const CHECKOUT_LABEL: &str = "Proceed to Checkout";

/// Checkout button label for an empty cart.
pub const EMPTY_CART_LABEL: &str = "Cart is Empty";

/// One cart row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    /// Formatted unit price (e.g., `$12.50`).
    pub unit_price: String,
    /// Formatted unit price × quantity.
    pub line_total: String,
}

impl From<&LineItem> for CartItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity,
            unit_price: format_price(item.unit_price),
            line_total: format_price(item.line_total()),
        }
    }
}

/// The whole cart, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
    /// Total units, for the navigation badge.
    pub item_count: u32,
    pub is_empty: bool,
    pub checkout_label: &'static str,
}

impl CartView {
    /// Build the view of `cart` priced with `pricing`.
    #[must_use]
    pub fn new(cart: &Cart, pricing: &Pricing) -> Self {
        let totals = pricing.totals(cart);
        let is_empty = cart.is_empty();
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: format_price(totals.subtotal),
            shipping: format_price(totals.shipping),
            tax: format_price(totals.tax),
            total: format_price(totals.total),
            item_count: cart.item_count(),
            is_empty,
            checkout_label: if is_empty {
                EMPTY_CART_LABEL
            } else {
                CHECKOUT_LABEL
            },
        }
    }

    /// Whether the checkout control should accept input.
    #[must_use]
    pub const fn can_check_out(&self) -> bool {
        !self.is_empty
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::new(&Cart::new(), &Pricing::default());
        assert!(view.is_empty);
        assert!(!view.can_check_out());
        assert!(view.items.is_empty());
        assert_eq!(view.checkout_label, "Cart is Empty");
        assert_eq!(view.subtotal, "$0.00");
        assert_eq!(view.total, "$7.99");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_reference_cart_view() {
        let mut cart = Cart::new();
        cart.add(LineItem::new("a", "Mug", Decimal::new(10, 0), 2, "mug.jpg"))
            .unwrap();
        cart.add(LineItem::new("b", "Tee", Decimal::new(5, 0), 1, "tee.jpg"))
            .unwrap();

        let view = CartView::new(&cart, &Pricing::default());

        assert_eq!(view.checkout_label, "Proceed to Checkout");
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$25.00");
        assert_eq!(view.shipping, "$7.99");
        assert_eq!(view.tax, "$1.00");
        assert_eq!(view.total, "$33.99");
        assert_eq!(
            view.items[0],
            CartItemView {
                id: "a".to_string(),
                name: "Mug".to_string(),
                image: "mug.jpg".to_string(),
                quantity: 2,
                unit_price: "$10.00".to_string(),
                line_total: "$20.00".to_string(),
            }
        );
    }

    #[test]
    fn test_view_serializes_for_templates() {
        let view = CartView::new(&Cart::new(), &Pricing::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["checkout_label"], "Cart is Empty");
        assert_eq!(json["is_empty"], true);
    }
}
