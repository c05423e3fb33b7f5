//! Catalog browsing command handlers.

use std::sync::Arc;

use kcat_core::{AppConfig, AttributeKind, Variant};
use kcat_erp::{AttributeCache, ErpClient, ItemQuery, TemplateLoader};
use kcat_filter::{AttributeState, FilterSession, FilterValue, PageWindow, SessionHandle, SkuLayout};
use rust_decimal::Decimal;
use serde::Serialize;

/// Fallback cell for absent values.
const NONE: &str = "-";

fn build_loader(config: &AppConfig) -> anyhow::Result<TemplateLoader> {
    let client = ErpClient::from_config(config)?;
    Ok(TemplateLoader::new(
        Arc::new(client),
        Arc::new(AttributeCache::new()),
        config.erp_page_limit,
    ))
}

fn new_session(config: &AppConfig, page_size: usize) -> SessionHandle {
    let layout = SkuLayout::new(config.sku_base_segments, config.sku_delimiter.clone());
    SessionHandle::new(FilterSession::new(layout, page_size))
}

fn describe_kind(kind: &AttributeKind) -> String {
    match kind {
        AttributeKind::Numeric {
            from_range,
            to_range,
            increment: Some(step),
        } => format!("numeric {from_range}..={to_range} step {step}"),
        AttributeKind::Numeric {
            from_range,
            to_range,
            increment: None,
        } => format!("numeric {from_range}..={to_range}"),
        AttributeKind::Categorical { values } => {
            let shown: Vec<String> = values
                .iter()
                .map(|v| format!("{} ({})", v.display_value, v.abbreviation))
                .collect();
            format!("one of {}", shown.join(", "))
        }
    }
}

fn fmt_price(price: Option<Decimal>) -> String {
    price.map_or_else(|| "on request".to_string(), |p| p.round_dp(2).to_string())
}

/// Show a template's attributes with SKU position, kind and load status.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the template or its
/// variants cannot be fetched.
pub(crate) async fn run_template(config: &AppConfig, code: &str) -> anyhow::Result<()> {
    let loader = build_loader(config)?;
    let session = new_session(config, config.catalog_page_size);
    let report = loader.open(&session, code).await?;

    session.read(|s| {
        println!("Template: {code}");
        println!("Variants: {}", report.variant_count);
        println!();

        if s.positions().is_empty() {
            println!("no attributes declared; every variant is listed unfiltered");
            return;
        }

        let header = format!("{:<5}{:<24}{:<14}KIND", "POS", "ATTRIBUTE", "STATUS");
        println!("{header}");
        for (name, position) in s.positions().iter() {
            let status = match s.attribute_state(name) {
                Some(AttributeState::Ready) => "ready".to_string(),
                Some(AttributeState::Unavailable(reason)) => {
                    tracing::debug!(attribute = name, reason = %reason, "attribute unavailable");
                    "unavailable".to_string()
                }
                Some(AttributeState::Pending) | None => "pending".to_string(),
            };
            let kind = s
                .schemas()
                .get(name)
                .map_or_else(|| NONE.to_string(), |schema| describe_kind(&schema.kind));
            println!("{position:<5}{name:<24}{status:<14}{kind}");
        }
    });

    Ok(())
}

#[derive(Debug, Serialize)]
struct VariantPageOutput<'a> {
    template: &'a str,
    #[serde(flatten)]
    window: PageWindow,
    variants: Vec<&'a Variant>,
}

/// Load a template's variants, apply filters, and print the requested page.
///
/// Filters on attributes the template does not declare, or whose detail
/// could not be fetched, do not narrow the result; a warning is logged.
///
/// # Errors
///
/// Returns an error if the template or its variants cannot be fetched, or
/// JSON output cannot be serialized.
pub(crate) async fn run_variants(
    config: &AppConfig,
    code: &str,
    filters: Vec<(String, FilterValue)>,
    page: usize,
    page_size: usize,
    json: bool,
) -> anyhow::Result<()> {
    let loader = build_loader(config)?;
    let session = new_session(config, page_size);
    loader.open(&session, code).await?;

    session.update(|s| {
        for (name, value) in filters {
            if !s.schemas().contains_key(&name) {
                tracing::warn!(attribute = %name, "attribute has no usable schema; filter ignored");
            }
            s.set_filter(name, value);
        }
        s.set_page(page);
    });

    session.read(|s| -> anyhow::Result<()> {
        let result = s.result();

        if json {
            let output = VariantPageOutput {
                template: code,
                window: result.window,
                variants: result.page_items().to_vec(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        if result.matches.is_empty() {
            println!("no variants match the selected filters");
            return Ok(());
        }

        let header = format!("{:<32}{:<36}{:>12}  UOM", "SKU", "NAME", "PRICE");
        println!("{header}");
        for variant in result.page_items() {
            println!(
                "{:<32}{:<36}{:>12}  {}",
                variant.sku,
                truncate(&variant.display_name, 34),
                fmt_price(variant.price),
                variant.unit_of_measure.as_deref().unwrap_or(NONE)
            );
        }
        println!();
        println!("{} ({} matching)", result.window, result.window.total_matches);
        Ok(())
    })
}

/// List catalog items, optionally narrowed by brand and item group.
///
/// # Errors
///
/// Returns an error if the listing cannot be fetched or serialized.
pub(crate) async fn run_items(
    config: &AppConfig,
    brand: Option<String>,
    group: Option<String>,
    page: usize,
    json: bool,
) -> anyhow::Result<()> {
    let client = ErpClient::from_config(config)?;
    let page_size = config.catalog_page_size.max(1);
    let start = u64::try_from((page.max(1) - 1).saturating_mul(page_size)).unwrap_or(u64::MAX);
    let limit = u32::try_from(page_size).unwrap_or(u32::MAX);
    let query = ItemQuery {
        brand,
        item_group: group,
    };

    let items = client.fetch_items_page(&query, start, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("no items found on page {}", page.max(1));
        return Ok(());
    }

    let header = format!(
        "{:<24}{:<36}{:<20}{:<10}PRICE",
        "CODE", "NAME", "BRAND", "VARIANTS"
    );
    println!("{header}");
    for item in &items {
        println!(
            "{:<24}{:<36}{:<20}{:<10}{}",
            item.item_code,
            truncate(&item.item_name, 34),
            item.brand.as_deref().unwrap_or(NONE),
            if item.has_variants { "yes" } else { "no" },
            fmt_price(item.price)
        );
    }
    Ok(())
}

/// List all brands.
///
/// # Errors
///
/// Returns an error if the brand list cannot be fetched.
pub(crate) async fn run_brands(config: &AppConfig) -> anyhow::Result<()> {
    let client = ErpClient::from_config(config)?;
    let brands = client.list_brands().await?;

    if brands.is_empty() {
        println!("no brands found");
        return Ok(());
    }
    for brand in &brands {
        match &brand.description {
            Some(description) => println!("{:<28}{}", brand.name, truncate(description, 60)),
            None => println!("{}", brand.name),
        }
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
