use std::path::Path;

use anyhow::Context;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;

use citizens::client::{IndexerClient, QueryClient, StatsClient};
use citizens::dashboard::{
    bridger_interactions_panel, first_method_panel, governance_panel, new_users_panel,
    nft_sales_volume_panel, pool_activity_panel, rainbow_bridge_panel, rewards_by_token_panel,
    staker_rank_panel, token_price_panel, top_nft_projects_panel, top_nft_sales_panel,
    top_pools_panel, top_tokens_panel, tvl_panel, user_activity_panel, validator_history_panel,
    Panel, PoolMeasure, ProjectWindow,
};
use citizens::Settings;

const OUTPUT_DIR: &str = "panels";
const TOP_N: usize = 25;

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    // Load configuration
    let settings = Settings::new()
        .context("Failed to load configuration. Check config.yaml and CITIZENS__* variables")?;

    let queries = QueryClient::new(&settings)?;
    let stats = StatsClient::new(&settings)?;
    let indexer = IndexerClient::new(&settings)?;
    let precorrection = settings.normalizer.precorrection;

    let output_dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {OUTPUT_DIR}"))?;

    // Panels are independent: one failing upstream must not take down the
    // rest of the snapshot, so each result is written (or placeheld) on
    // its own.
    let price_tokens = vec![
        ("wrap.near".to_string(), "wNEAR".to_string()),
        ("token.v2.ref-finance.near".to_string(), "REF".to_string()),
    ];

    write_panel(
        output_dir,
        "crosschain_all_users",
        user_activity_panel(&queries, "all_users", true).await,
    )?;
    write_panel(
        output_dir,
        "crosschain_active_users",
        user_activity_panel(&queries, "active_users", true).await,
    )?;
    write_panel(
        output_dir,
        "rewards_by_token",
        rewards_by_token_panel(&queries, &stats, precorrection).await,
    )?;
    write_panel(
        output_dir,
        "pool_activity",
        pool_activity_panel(&queries, &stats, PoolMeasure::Total, precorrection).await,
    )?;
    write_panel(
        output_dir,
        "pool_activity_average",
        pool_activity_panel(&queries, &stats, PoolMeasure::Average, precorrection).await,
    )?;
    write_panel(
        output_dir,
        "token_prices",
        token_price_panel(&stats, &price_tokens, "Token Prices").await,
    )?;
    write_panel(output_dir, "tvl", tvl_panel(&stats, 730).await)?;
    write_panel(output_dir, "top_pools", top_pools_panel(&stats, TOP_N).await)?;
    write_panel(output_dir, "top_tokens", top_tokens_panel(&stats, TOP_N).await)?;
    write_panel(output_dir, "governance", governance_panel(&indexer, TOP_N).await)?;
    write_panel(
        output_dir,
        "staker_ranks",
        staker_rank_panel(&queries, &indexer, TOP_N).await,
    )?;
    write_panel(
        output_dir,
        "validator_history",
        validator_history_panel(&indexer, None).await,
    )?;
    write_panel(output_dir, "new_users", new_users_panel(&queries).await)?;
    write_panel(
        output_dir,
        "first_methods",
        first_method_panel(&queries, None, 30).await,
    )?;
    write_panel(output_dir, "rainbow_bridge", rainbow_bridge_panel(&queries).await)?;
    write_panel(
        output_dir,
        "bridger_interactions",
        bridger_interactions_panel(&queries, TOP_N).await,
    )?;
    write_panel(output_dir, "nft_sales_volume", nft_sales_volume_panel(&queries).await)?;
    write_panel(
        output_dir,
        "top_nft_projects",
        top_nft_projects_panel(&queries, ProjectWindow::Lifetime, 40).await,
    )?;
    write_panel(
        output_dir,
        "top_nft_projects_week",
        top_nft_projects_panel(&queries, ProjectWindow::PastWeek, 40).await,
    )?;
    write_panel(output_dir, "top_nft_sales", top_nft_sales_panel(&queries).await)?;

    info!("Snapshot complete, panels written to {OUTPUT_DIR}/");
    Ok(())
}

/// Serialize one panel to `<dir>/<slug>.json`. A failed panel is logged
/// and written as a placeholder document so consumers can render an
/// inline error instead of a hole.
fn write_panel(dir: &Path, slug: &str, panel: citizens::Result<Panel>) -> anyhow::Result<()> {
    let document = match panel {
        Ok(panel) => {
            info!("built panel {slug} ({} metrics)", panel.metrics.len());
            serde_json::to_value(&panel)?
        },
        Err(err) => {
            error!("panel {slug} failed: {err}");
            serde_json::json!({ "title": slug, "error": err.to_string() })
        },
    };

    let path = dir.join(format!("{slug}.json"));
    std::fs::write(&path, serde_json::to_string_pretty(&document)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
