//! Cart totals.
//!
//! Totals are derived from a cart snapshot and never stored. Arithmetic is
//! exact decimal; only the tax line is rounded to cents, and display
//! formatting rounds the rest.

use mystore_core::round_money;
use rust_decimal::Decimal;

use crate::cart::Cart;

/// Shipping and tax settings applied to every cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    /// Flat shipping charge.
    pub shipping: Decimal,
    /// Tax rate as a fraction (0.04 = 4%).
    pub tax_rate: Decimal,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            shipping: Decimal::new(799, 2),
            tax_rate: Decimal::new(4, 2),
        }
    }
}

impl Pricing {
    /// Compute totals for `cart` with these settings.
    #[must_use]
    pub fn totals(&self, cart: &Cart) -> Totals {
        compute_totals(cart, self.shipping, self.tax_rate)
    }
}

/// Derived cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    /// Σ unit price × quantity.
    pub subtotal: Decimal,
    /// Flat shipping charge.
    pub shipping: Decimal,
    /// Subtotal × tax rate, rounded to cents.
    pub tax: Decimal,
    /// Subtotal + shipping + tax.
    pub total: Decimal,
}

/// Compute totals for a cart snapshot.
///
/// An empty cart still gets a total (equal to `shipping`); refusing to check
/// out an empty cart is the checkout's job. Sums that leave the `Decimal`
/// range saturate at `Decimal::MAX`.
#[must_use]
pub fn compute_totals(cart: &Cart, shipping: Decimal, tax_rate: Decimal) -> Totals {
    let subtotal = cart
        .items()
        .iter()
        .map(crate::cart::LineItem::line_total)
        .fold(Decimal::ZERO, saturating_add);
    let tax = round_money(subtotal.checked_mul(tax_rate).unwrap_or(Decimal::MAX));
    Totals {
        subtotal,
        shipping,
        tax,
        total: saturating_add(saturating_add(subtotal, shipping), tax),
    }
}

fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::LineItem;

    fn line(id: &str, price: Decimal, quantity: u32) -> LineItem {
        LineItem::new(id, id, price, quantity, "")
    }

    #[test]
    fn test_empty_cart_totals() {
        let totals = compute_totals(&Cart::new(), Decimal::new(799, 2), Decimal::new(4, 2));
        assert_eq!(totals.subtotal, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::new(799, 2));
    }

    #[test]
    fn test_reference_cart_totals() {
        let mut cart = Cart::new();
        cart.add(line("a", Decimal::new(10, 0), 2)).unwrap();
        cart.add(line("b", Decimal::new(5, 0), 1)).unwrap();

        let totals = Pricing::default().totals(&cart);
        assert_eq!(totals.subtotal, Decimal::new(2500, 2));
        assert_eq!(totals.tax, Decimal::new(100, 2));
        assert_eq!(totals.shipping, Decimal::new(799, 2));
        assert_eq!(totals.total, Decimal::new(3399, 2));
    }

    #[test]
    fn test_tax_is_rounded_but_subtotal_is_not() {
        let mut cart = Cart::new();
        // 3 × 3.333 = 9.999 → tax 0.39996 → 0.40
        cart.add(line("a", Decimal::new(3333, 3), 3)).unwrap();

        let totals = compute_totals(&cart, Decimal::ZERO, Decimal::new(4, 2));
        assert_eq!(totals.subtotal, Decimal::new(9999, 3));
        assert_eq!(totals.tax, Decimal::new(40, 2));
        assert_eq!(totals.total, Decimal::new(10_399, 3));
    }

    #[test]
    fn test_largest_cart_totals_do_not_panic() {
        let mut cart = Cart::new();
        for id in ["a", "b", "c"] {
            cart.add(line(id, crate::cart::MAX_UNIT_PRICE, 1)).unwrap();
            assert!(cart.set_quantity(id, i64::MAX));
        }

        let totals = Pricing::default().totals(&cart);
        let line_total = crate::cart::MAX_UNIT_PRICE * Decimal::from(u32::MAX);
        assert_eq!(totals.subtotal, line_total * Decimal::from(3));
        assert!(totals.total > totals.subtotal);

        let totals = compute_totals(&cart, Decimal::MAX, Decimal::new(4, 2));
        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn test_recomputation_is_stable() {
        let mut cart = Cart::new();
        cart.add(line("a", Decimal::new(199, 2), 7)).unwrap();
        let pricing = Pricing::default();
        assert_eq!(pricing.totals(&cart), pricing.totals(&cart.clone()));
    }
}
