//! Catalog browsing commands.

use lifestyle_store_core::{CurrencyCode, ProductId};
use lifestyle_store_storefront::Storefront;
use lifestyle_store_storefront::api::types::Product;
use lifestyle_store_storefront::catalog::ProductQuery;

use super::CommandError;

/// Print products matching `query`, remembering its search term.
#[allow(clippy::print_stdout)]
pub async fn list(shop: &mut Storefront, query: &ProductQuery) -> Result<(), CommandError> {
    if let Some(term) = &query.search {
        shop.searches_mut().record(term);
    }
    let products = shop.api().products().await?;
    let matches = query.apply(&products);

    if matches.is_empty() {
        println!("No products match.");
        return Ok(());
    }
    for product in &matches {
        println!("{}", summary(product));
    }
    println!("{} of {} products", matches.len(), products.len());
    Ok(())
}

/// Print one product in detail.
#[allow(clippy::print_stdout)]
pub async fn show(shop: &Storefront, id: ProductId) -> Result<(), CommandError> {
    let product = shop.api().product(id).await?;

    println!("{}", summary(&product));
    if let Some(original) = product.original_price {
        println!("  was {}", original.display(CurrencyCode::default()));
    }
    println!("  category: {}", product.category);
    println!("  rating:   {:.1} ({} reviews)", product.rating, product.reviews);
    println!("  stock:    {}", product.stock);
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
    Ok(())
}

/// Print the category list.
#[allow(clippy::print_stdout)]
pub async fn categories(shop: &Storefront) -> Result<(), CommandError> {
    for category in shop.api().categories().await? {
        match &category.description {
            Some(description) => println!("{:<12} {} - {description}", category.id, category.name),
            None => println!("{:<12} {}", category.id, category.name),
        }
    }
    Ok(())
}

/// Print recent search terms, or forget them with `clear`.
#[allow(clippy::print_stdout)]
pub fn searches(shop: &mut Storefront, clear: bool) {
    if clear {
        shop.searches_mut().clear();
        println!("Search history cleared.");
        return;
    }

    let terms = shop.searches().terms();
    if terms.is_empty() {
        println!("No recent searches.");
    }
    for term in terms {
        println!("{term}");
    }
}

fn summary(product: &Product) -> String {
    let badge = if product.is_new { " [new]" } else { "" };
    format!(
        "#{:<5} {:<32} {:>10}{badge}",
        product.id.as_i64(),
        product.name,
        product.price.display(CurrencyCode::default())
    )
}
