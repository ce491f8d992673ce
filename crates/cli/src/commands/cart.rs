//! Cart commands.

use std::io::{self, Write};

use mystore_cart::{LineItem, Storefront};
use mystore_core::ProductId;

use super::CommandError;
use crate::render;

/// Print the cart.
pub fn show(storefront: &Storefront) -> Result<(), CommandError> {
    render::cart(&mut io::stdout().lock(), &storefront.cart_view())?;
    Ok(())
}

/// Add `quantity` units of product `id`.
///
/// With `manual` (name, displayed price) the item is added as given;
/// otherwise name, price and stock come from the catalog.
pub async fn add(
    storefront: &Storefront,
    id: &str,
    quantity: u32,
    manual: Option<(String, String)>,
    image: &str,
) -> Result<(), CommandError> {
    let candidate = match manual {
        Some((name, price)) => LineItem::from_display(id, name, &price, quantity, image)?,
        None => {
            let product = storefront.api().get_product(&ProductId::new(id)).await?;
            LineItem::from_product(&product, quantity)?
        }
    };

    let name = candidate.name.clone();
    let cart = storefront.store().add_item(candidate)?;
    tracing::info!(id, quantity, "Added to cart");

    writeln!(
        io::stdout().lock(),
        "Added {name}. Cart now holds {} items.",
        cart.item_count()
    )?;
    Ok(())
}

/// Set the quantity of line item `id`.
pub fn set_quantity(storefront: &Storefront, id: &str, quantity: i64) -> Result<(), CommandError> {
    storefront.store().set_quantity(id, quantity)?;
    show(storefront)
}

/// Remove line item `id`.
pub fn remove(storefront: &Storefront, id: &str) -> Result<(), CommandError> {
    storefront.store().remove_item(id)?;
    show(storefront)
}

/// Empty the cart.
pub fn clear(storefront: &Storefront) -> Result<(), CommandError> {
    storefront
        .store()
        .clear()
        .map_err(mystore_cart::CartError::from)?;
    writeln!(io::stdout().lock(), "Cart cleared.")?;
    Ok(())
}
