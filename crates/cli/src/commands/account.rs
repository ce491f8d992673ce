//! Session commands.
//!
//! Tokens are issued by the backend; the CLI only stores and forgets them.

use std::io::{self, Write};

use mystore_cart::session::{ADMIN_ROLE, CUSTOMER_ROLE};
use mystore_cart::Storefront;
use mystore_core::SessionToken;
use secrecy::SecretString;

use super::CommandError;

/// Sign in as a customer, or as an administrator with `admin`.
pub async fn login(
    storefront: &Storefront,
    email: &str,
    password: String,
    admin: bool,
) -> Result<(), CommandError> {
    let password = SecretString::from(password);
    let (role, response) = if admin {
        (ADMIN_ROLE, storefront.api().admin_login(email, &password).await?)
    } else {
        (CUSTOMER_ROLE, storefront.api().login(email, &password).await?)
    };

    storefront
        .session()
        .sign_in(role, &SessionToken::new(response.token))?;

    let name = response
        .user
        .map(|user| user.name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| email.to_string());
    writeln!(io::stdout().lock(), "Welcome, {name}! Signed in as {role}.")?;
    Ok(())
}

/// Create a customer account. Does not sign in.
pub async fn register(
    storefront: &Storefront,
    name: &str,
    email: &str,
    password: String,
) -> Result<(), CommandError> {
    let password = SecretString::from(password);
    storefront.api().register(name, email, &password).await?;
    tracing::info!(email, "Registered account");
    writeln!(
        io::stdout().lock(),
        "Registration successful. Log in with `mystore login {email}`."
    )?;
    Ok(())
}

/// Forget every stored session token.
pub fn logout(storefront: &Storefront) -> Result<(), CommandError> {
    storefront.session().sign_out()?;
    writeln!(io::stdout().lock(), "Signed out.")?;
    Ok(())
}
