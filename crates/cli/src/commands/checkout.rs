//! Checkout command.

use std::io::{self, Write};

use mystore_cart::Storefront;

use super::CommandError;

/// Submit the cart as an order.
pub async fn submit(storefront: &Storefront) -> Result<(), CommandError> {
    let total = storefront.cart_view().total;

    match storefront.checkout().checkout().await {
        Ok(confirmation) => {
            let message = confirmation
                .message
                .unwrap_or_else(|| "Order placed successfully!".to_string());
            writeln!(io::stdout().lock(), "{message} Total charged: {total}.")?;
            Ok(())
        }
        Err(e) if e.requires_sign_in() => {
            writeln!(io::stdout().lock(), "{}", e.user_message())?;
            writeln!(io::stdout().lock(), "Run `mystore login <email>` first.")?;
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
