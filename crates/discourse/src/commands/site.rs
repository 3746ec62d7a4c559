//! Site command - show site info.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;

/// Arguments for the site command.
#[derive(Args, Debug)]
pub struct SiteArgs {}

/// Run the site command.
pub async fn run(_args: SiteArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let site = client.site().get().await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&site)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!("{}", Style::new().bold().apply_to(client.base_url()));
    println!("{}", dim.apply_to("─".repeat(40)));
    for category in &site.categories {
        println!(
            "  {:>5}  {:<24} {}",
            category.id,
            category.slug,
            dim.apply_to(&category.name)
        );
    }
    if ctx.verbose {
        println!();
        println!("{} {}", dim.apply_to("Other fields:"), site.extra.len());
    }
    Ok(())
}
