mod catalog;
mod quote;

use clap::{Parser, Subcommand};
use kcat_filter::FilterValue;
use tracing_subscriber::EnvFilter;

use crate::quote::{QuoteCommands, WishlistCommands};

#[derive(Debug, Parser)]
#[command(name = "kcat")]
#[command(about = "Browse parameterized ERP catalog items and keep a quote list")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show a template's attributes, their SKU positions and load status
    Template {
        /// Template item code (e.g. LC-OAK-CHR-0001)
        code: String,
    },
    /// List a template's variants, narrowed by attribute filters
    Variants {
        /// Template item code
        code: String,
        /// Attribute filter as NAME=VALUE; repeat to combine (all must match)
        #[arg(long = "filter", value_name = "NAME=VALUE", value_parser = parse_filter)]
        filters: Vec<(String, FilterValue)>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Variants per page (defaults to KCAT_CATALOG_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<usize>,
        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },
    /// List catalog items (templates and standalone items)
    Items {
        /// Only items of this brand
        #[arg(long)]
        brand: Option<String>,
        /// Only items of this item group
        #[arg(long)]
        group: Option<String>,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },
    /// List brands
    Brands,
    /// Manage the local quote cart
    Quote {
        #[command(subcommand)]
        command: QuoteCommands,
    },
    /// Manage the local wishlist
    Wishlist {
        #[command(subcommand)]
        command: WishlistCommands,
    },
}

/// Parses `NAME=VALUE`. The value keeps its exact text; numeric attributes
/// coerce it when the filter is evaluated.
fn parse_filter(raw: &str) -> Result<(String, FilterValue), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got \"{raw}\""))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing attribute name in \"{raw}\""));
    }
    if value.trim().is_empty() {
        return Err(format!("missing value for attribute \"{name}\""));
    }
    Ok((name.to_owned(), FilterValue::from(value.trim())))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = kcat_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, erp = %config.erp_base_url, "configuration loaded");

    match cli.command {
        Commands::Template { code } => catalog::run_template(&config, &code).await?,
        Commands::Variants {
            code,
            filters,
            page,
            page_size,
            json,
        } => {
            let page_size = page_size.unwrap_or(config.catalog_page_size);
            catalog::run_variants(&config, &code, filters, page, page_size, json).await?;
        }
        Commands::Items {
            brand,
            group,
            page,
            json,
        } => catalog::run_items(&config, brand, group, page, json).await?,
        Commands::Brands => catalog::run_brands(&config).await?,
        Commands::Quote { command } => quote::run_quote(&config, command).await?,
        Commands::Wishlist { command } => quote::run_wishlist(&config, command)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
