//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! khoojlo checkout --first-name Asha --last-name Rai \
//!     --address "12 Lake Road" --city Pokhara --zip 33700 --phone 9800000000
//! ```

use std::io::Write;

use khoojlo_core::ShippingDetails;
use khoojlo_storefront::checkout::{OrderReceipt, checkout};

use super::cart::{render_lines, render_totals, write_json};
use super::{CliError, Context};

/// Place an order for the cart through the order API.
pub async fn place(
    ctx: &Context,
    details: &ShippingDetails,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let api = ctx.api()?;
    let receipt = checkout(&ctx.store, &api, details).await?;

    if json {
        return write_json(&receipt, out);
    }
    render_receipt(&receipt, out)
}

fn render_receipt(receipt: &OrderReceipt, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(
        out,
        "Order #{} placed at {}",
        receipt.order_id,
        receipt.placed_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    render_lines(&receipt.lines, out)?;
    render_totals(&receipt.totals, out)
}
