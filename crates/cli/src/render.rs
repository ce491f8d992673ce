//! Plain-text rendering of view models to stdout.

use std::io::{self, Write};

use mystore_cart::{CartView, Product};
use mystore_core::format_price;

/// Write the cart table and totals.
pub fn cart(out: &mut impl Write, view: &CartView) -> io::Result<()> {
    if view.is_empty {
        writeln!(out, "Your cart is empty.")?;
    } else {
        for item in &view.items {
            writeln!(
                out,
                "{:<26} {:<30} {:>4} x {:>9} = {:>10}",
                item.id, item.name, item.quantity, item.unit_price, item.line_total
            )?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{:<12}{:>12}", "Subtotal", view.subtotal)?;
    writeln!(out, "{:<12}{:>12}", "Shipping", view.shipping)?;
    writeln!(out, "{:<12}{:>12}", "Tax", view.tax)?;
    writeln!(out, "{:<12}{:>12}", "Total", view.total)?;
    writeln!(out, "[{}] ({} items)", view.checkout_label, view.item_count)?;
    if view.can_check_out() {
        writeln!(out, "Run `mystore checkout` to place your order.")?;
    }
    Ok(())
}

/// Write one line per catalog product.
pub fn products(out: &mut impl Write, products: &[Product]) -> io::Result<()> {
    if products.is_empty() {
        return writeln!(out, "No products available.");
    }
    for product in products {
        let stock = if product.in_stock() {
            format!("{} in stock", product.stock)
        } else {
            "sold out".to_string()
        };
        writeln!(
            out,
            "{:<26} {:<30} {:>9}  {}",
            product.id.as_str(),
            product.name,
            format_price(product.price),
            stock
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mystore_cart::{Cart, LineItem, Pricing};

    use super::*;

    fn rendered(view: &CartView) -> String {
        let mut out = Vec::new();
        cart(&mut out, view).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_cart_output() {
        let text = rendered(&CartView::new(&Cart::new(), &Pricing::default()));
        assert!(text.contains("Your cart is empty."));
        assert!(text.contains("$7.99"));
        assert!(text.contains("[Cart is Empty]"));
        assert!(!text.contains("mystore checkout"));
    }

    #[test]
    fn test_cart_output_lists_items() {
        let cart: Cart = [LineItem::from_display("a", "Mug", "$10.00", 2, "").unwrap()]
            .into_iter()
            .collect();
        let text = rendered(&CartView::new(&cart, &Pricing::default()));
        assert!(text.contains("Mug"));
        assert!(text.contains("$20.00"));
        assert!(text.contains("$28.79"));
        assert!(text.contains("[Proceed to Checkout] (2 items)"));
        assert!(text.contains("Run `mystore checkout` to place your order."));
    }
}
