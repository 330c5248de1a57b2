// Forbid unwrap() in production code.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use bnode::config::InspectConfig;
use bnode::inspect::summarize_file;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bnode=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Sizing constants must allow a maximal record in a single page.
    if let Err(e) = bnode::verify_layout() {
        tracing::error!("Node layout check failed: {e}");
        std::process::exit(1);
    }

    let config = match InspectConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Inspecting page_file={}, max_records={}",
        config.page_file.display(),
        config.max_records
    );

    let summaries = match summarize_file(&config.page_file, config.max_records) {
        Ok(summaries) => summaries,
        Err(e) => {
            tracing::error!("Failed to inspect {}: {e}", config.page_file.display());
            std::process::exit(1);
        }
    };

    for summary in &summaries {
        println!("{summary}");
    }
    tracing::info!("{} pages inspected", summaries.len());
}
