//! Product lookup commands.

use std::io::Write;

use khoojlo_core::slug::product_url;
use khoojlo_core::{Price, Product, ProductId};

use super::cart::write_json;
use super::{CliError, Context, format_unit_price};

/// Print the storefront path of a product page.
pub fn url(id: &str, name: &str, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "{}", product_url(&ProductId::new(id), name))?;
    Ok(())
}

/// Print one product from the catalog.
pub async fn show(
    ctx: &Context,
    id: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let product = ctx.api()?.get_product(&ProductId::new(id)).await?;
    if json {
        return write_json(&product, out);
    }
    render_product(ctx, &product, out)
}

/// Print catalog search results.
pub async fn search(
    ctx: &Context,
    query: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let products = ctx.api()?.search_products(query).await?;
    if json {
        return write_json(&products, out);
    }
    if products.is_empty() {
        writeln!(out, "No products found for \"{query}\"")?;
    }
    for product in &products {
        render_product(ctx, product, out)?;
    }
    Ok(())
}

fn render_product(ctx: &Context, product: &Product, out: &mut impl Write) -> Result<(), CliError> {
    let id = product.product_id();
    let name = product.name.as_deref().unwrap_or_default();
    writeln!(
        out,
        "[{id}] {name}  {}  {}",
        format_unit_price(Price::coerce(&product.price)),
        product_url(&id, name),
    )?;
    if let Some(path) = product.image_path() {
        writeln!(out, "      {}", ctx.config.media_base.resolve(path))?;
    }
    Ok(())
}
