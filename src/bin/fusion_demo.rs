//! Demo that merges a JSON batch of assessments and prints the profile.
//!
//! Usage: `fusion_demo [batch.json]` (defaults to `demos/batch.json`).
//! The file holds either a plain array of assessments or
//! `{"sources": [...], "signals": {"advancedAnalysisSucceeded": true}}`.

use anyhow::Context;
use serde::Deserialize;
use std::{fs, sync::Arc};
use style_fusion::{merge_profile_async, FusionConfig, QualitySignals, SourceAssessment};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Deserialize)]
#[serde(untagged)]
enum Batch {
    Plain(Vec<SourceAssessment>),
    WithSignals {
        sources: Vec<SourceAssessment>,
        #[serde(default)]
        signals: QualitySignals,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev (STYLE_FUSION_CONFIG_PATH, RUST_LOG).
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fusion=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/batch.json".to_string());
    let raw = fs::read_to_string(&path).with_context(|| format!("reading batch from {path}"))?;
    let (sources, signals) = match serde_json::from_str::<Batch>(&raw)
        .with_context(|| format!("parsing batch {path}"))?
    {
        Batch::Plain(sources) => (sources, QualitySignals::default()),
        Batch::WithSignals { sources, signals } => (sources, signals),
    };

    let cfg = Arc::new(FusionConfig::load_default()?);
    let profile = merge_profile_async(sources, signals, cfg).await;

    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
