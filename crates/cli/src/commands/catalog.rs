//! Catalog commands.

use std::io;

use mystore_cart::Storefront;

use super::CommandError;
use crate::render;

/// Print the product catalog.
pub async fn list(storefront: &Storefront) -> Result<(), CommandError> {
    let products = storefront.api().list_products().await?;
    render::products(&mut io::stdout().lock(), &products)?;
    Ok(())
}
