//! # Storefront Entry Point
//!
//! Loads the catalog and prints the rendered page.
//!
//! ```text
//! larek-storefront [CONFIG]
//!
//!   CONFIG   path to storefront.toml (default: platform config dir)
//! ```

use std::path::PathBuf;

use anyhow::Context;
use larek_storefront::{build_presenter, init_tracing, StorefrontConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = StorefrontConfig::load_or_default(config_path);

    let presenter = build_presenter(&config).context("failed to start storefront")?;

    match presenter.load_catalog().await {
        Ok(count) => info!(count, "Gallery rendered"),
        Err(_) => info!("Gallery left empty"),
    }

    println!("{}", presenter.page_html());
    Ok(())
}
