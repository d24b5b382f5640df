//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! khoojlo cart add 7 --quantity 2 --name "Desk Lamp" --price 19.99
//! khoojlo cart set 7 5
//! khoojlo cart remove 7
//! khoojlo cart totals --checkout
//! ```

use std::io::Write;

use khoojlo_core::{Cart, CartLine, CartTotals, Product, ProductId, ShippingPolicy};

use super::{CliError, Context, format_price, format_unit_price};

/// Where `cart add` takes the product details from.
pub enum ProductSource {
    /// Fetch the product from the catalog API.
    Catalog,
    /// Use the details given on the command line.
    Manual {
        name: Option<String>,
        price: Option<String>,
        image: Option<String>,
    },
}

/// Print the cart lines and cart page totals.
pub fn show(ctx: &Context, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    let cart = ctx.store.read();
    if json {
        return write_json(&cart, out);
    }

    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }
    render_lines(cart.lines(), out)?;
    render_totals(&CartTotals::compute(&cart, &ShippingPolicy::cart_page())?, out)
}

/// Print the number of units in the cart.
pub fn count(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "{}", ctx.store.count())?;
    Ok(())
}

/// Add units of a product.
pub async fn add(
    ctx: &Context,
    id: &str,
    quantity: &str,
    source: ProductSource,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let product = match source {
        ProductSource::Catalog => ctx.api()?.get_product(&ProductId::new(id)).await?,
        ProductSource::Manual { name, price, image } => {
            let mut product = Product::new(id);
            if let Some(name) = name {
                product = product.with_name(name);
            }
            if let Some(price) = price {
                product = product.with_price(price);
            }
            if let Some(image) = image {
                product = product.with_image(image);
            }
            product
        }
    };

    let cart = ctx.store.add_line(&product, quantity);
    summarize(&cart, json, out)
}

/// Remove a product's line.
pub fn remove(ctx: &Context, id: &str, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    let cart = ctx.store.remove_line(id);
    summarize(&cart, json, out)
}

/// Set a line's quantity.
pub fn set(
    ctx: &Context,
    id: &str,
    quantity: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let cart = ctx.store.set_quantity(id, quantity);
    summarize(&cart, json, out)
}

/// Empty the cart.
pub fn clear(ctx: &Context, out: &mut impl Write) -> Result<(), CliError> {
    ctx.store.clear();
    writeln!(out, "Cart cleared")?;
    Ok(())
}

/// Print totals under the cart page or checkout shipping policy.
pub fn totals(
    ctx: &Context,
    checkout: bool,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let policy = if checkout {
        ShippingPolicy::checkout()
    } else {
        ShippingPolicy::cart_page()
    };
    let totals = CartTotals::compute(&ctx.store.read(), &policy)?;

    if json {
        return write_json(&totals, out);
    }
    render_totals(&totals, out)
}

fn summarize(cart: &Cart, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    if json {
        return write_json(cart, out);
    }
    let units = cart.count();
    writeln!(
        out,
        "{units} {} in cart ({} {})",
        if units == 1 { "item" } else { "items" },
        cart.len(),
        if cart.len() == 1 { "line" } else { "lines" },
    )?;
    Ok(())
}

pub(super) fn render_lines(lines: &[CartLine], out: &mut impl Write) -> Result<(), CliError> {
    for line in lines {
        let name = if line.name.is_empty() { "(unnamed)" } else { line.name.as_str() };
        writeln!(
            out,
            "{:>4} x {name} [{}]  {} each  {}",
            line.quantity.get(),
            line.id,
            format_unit_price(line.price),
            format_price(line.line_total()?),
        )?;
    }
    Ok(())
}

pub(super) fn render_totals(totals: &CartTotals, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "Subtotal: {}", format_price(totals.subtotal))?;
    writeln!(out, "Shipping: {}", format_price(totals.shipping))?;
    writeln!(out, "Total:    {}", format_price(totals.total))?;
    Ok(())
}

pub(super) fn write_json(value: &impl serde::Serialize, out: &mut impl Write) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
