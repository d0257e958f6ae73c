//! Account commands.

use std::io::BufRead;

use secrecy::SecretString;

use lifestyle_store_core::{CurrencyCode, WishlistId};
use lifestyle_store_storefront::Storefront;
use lifestyle_store_storefront::error::AppError;

use super::CommandError;

/// Sign in with `email`.
#[allow(clippy::print_stdout)]
pub async fn login(
    shop: &mut Storefront,
    email: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = password_or_stdin(password)?;
    let user = shop.login(email, password).await?;
    println!("Signed in as {} <{}>", user.username, user.email);
    Ok(())
}

/// Create an account.
#[allow(clippy::print_stdout)]
pub async fn register(
    shop: &mut Storefront,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = password_or_stdin(password)?;
    match shop.register(username, email, password).await? {
        Some(user) => println!("Registered and signed in as {}", user.username),
        None => println!("Registered. Sign in with `ls-cli login -e {email}`."),
    }
    Ok(())
}

/// Sign out.
#[allow(clippy::print_stdout)]
pub fn logout(shop: &mut Storefront) {
    let was_signed_in = shop.session().is_authenticated();
    shop.logout();
    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("Not signed in.");
    }
}

/// Print the stored identity.
#[allow(clippy::print_stdout)]
pub fn whoami(shop: &Storefront) {
    match shop.session().current_user() {
        Some(user) => println!("#{} {} <{}>", user.id, user.username, user.email),
        None => println!("Not signed in."),
    }
}

/// Print the profile from the backend.
#[allow(clippy::print_stdout)]
pub async fn profile(shop: &Storefront) -> Result<(), CommandError> {
    if !shop.session().is_authenticated() {
        return Err(AppError::NotSignedIn.into());
    }
    let profile = shop.authed_api().profile().await?;

    println!("#{} {} <{}>", profile.id, profile.username, profile.email);
    if let Some(phone) = &profile.phone {
        println!("  phone:  {phone}");
    }
    if let Some(created_at) = profile.created_at {
        println!("  member since {}", created_at.format("%Y-%m-%d"));
    }
    Ok(())
}

/// Print saved shipping addresses.
#[allow(clippy::print_stdout)]
pub async fn addresses(shop: &Storefront) -> Result<(), CommandError> {
    let addresses = shop.addresses().await?;
    if addresses.is_empty() {
        println!("No saved addresses.");
    }
    for address in addresses {
        let marker = if address.is_default { "*" } else { " " };
        println!("{marker} #{:<5} {}", address.id.as_i64(), address.one_line());
    }
    Ok(())
}

/// Print the wishlist, or drop one entry first with `remove`.
#[allow(clippy::print_stdout)]
pub async fn wishlist(shop: &Storefront, remove: Option<WishlistId>) -> Result<(), CommandError> {
    if let Some(id) = remove {
        shop.authed_api().remove_from_wishlist(id).await?;
        println!("Removed #{id} from the wishlist.");
    }

    let items = shop.wishlist().await?;
    if items.is_empty() {
        println!("Wishlist is empty.");
    }
    for item in items {
        match &item.product {
            Some(product) => println!(
                "#{:<5} {:<32} {:>10}",
                item.id.as_i64(),
                product.name,
                product.price.display(CurrencyCode::default())
            ),
            None => println!("#{:<5} (no longer available)", item.id.as_i64()),
        }
    }
    Ok(())
}

/// Print the inbox, unread first.
#[allow(clippy::print_stdout)]
pub async fn notifications(shop: &Storefront) -> Result<(), CommandError> {
    let mut inbox = shop.notifications().await?;
    if inbox.is_empty() {
        println!("No notifications.");
    }
    inbox.sort_by_key(|n| n.is_read);
    for notification in inbox {
        let marker = if notification.is_read { " " } else { "*" };
        println!("{marker} {}", notification.title);
        if !notification.content.is_empty() {
            println!("    {}", notification.content);
        }
    }
    Ok(())
}

/// Print stored payment methods.
#[allow(clippy::print_stdout)]
pub async fn payment_methods(shop: &Storefront) -> Result<(), CommandError> {
    let methods = shop.payment_methods().await?;
    if methods.is_empty() {
        println!("No saved payment methods.");
    }
    for method in methods {
        let marker = if method.is_default { "*" } else { " " };
        println!("{marker} {:<12} {}", method.provider, method.masked());
    }
    Ok(())
}

/// Use the given password or read one line from stdin.
fn password_or_stdin(password: Option<String>) -> Result<SecretString, CommandError> {
    let password = match password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };

    let password = password.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(CommandError::EmptyPassword);
    }
    Ok(SecretString::from(password.to_string()))
}
