// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::env;
use std::sync::Arc;
use std::time::Instant;
use the_conveyor::config::load_and_validate_config;
use the_conveyor::engine::{BatchOutcome, BatchProcessor, CancellationContext, TaskOutcome, WorkItem};
use the_conveyor::traits::{Handler, ProgressReporter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Demo handler: uppercases its input.
///
/// Items starting with `fail` return an error and items starting with `slow`
/// wait for cancellation, so a configured timeout or retry policy is visible
/// in the output.
struct ShoutHandler;

#[async_trait]
impl Handler<String, String> for ShoutHandler {
    async fn handle(
        &self,
        item: &WorkItem<String>,
        progress: &ProgressReporter,
        cancel: &CancellationContext,
    ) -> Result<String> {
        if item.payload.starts_with("fail") {
            bail!("refusing to process {:?}", item.payload);
        }
        if item.payload.starts_with("slow") {
            progress.report(serde_json::json!({ "state": "waiting" }));
            cancel.cancelled().await;
            bail!("cancelled while waiting");
        }
        Ok(item.payload.to_uppercase())
    }

    fn name(&self) -> &'static str {
        "shout"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <config.yaml|config.toml> <item> [item ...]", args[0]);
        eprintln!("Example: {} configs/demo.yaml hello \"fail me\" world", args[0]);
        std::process::exit(1);
    }

    let config_file = &args[1];
    let items: Vec<String> = args[2..].to_vec();

    let config = load_and_validate_config(config_file)
        .with_context(|| format!("loading {}", config_file))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🚚 Conveyor batch run");
    println!("═══════════════════════════════════");
    println!("📋 Configuration: {}", config_file);
    println!("⚙️  Concurrency: {}", config.processor.concurrency);
    println!("📦 Items: {}", items.len());
    println!();

    let start_time = Instant::now();
    let handler: Arc<dyn Handler<String, String>> = Arc::new(ShoutHandler);
    let processor = BatchProcessor::new(handler, items.clone(), config.processor)?;
    let outcome = processor.start().await;

    for (input, result) in items.iter().zip(outcome.results()) {
        match result {
            TaskOutcome::Success(value) => println!("✅ {:?} → {:?}", input, value),
            TaskOutcome::Failure(error) => {
                println!("❌ {:?} → {} ({})", input, error, error.kind())
            }
        }
    }

    println!();
    match &*outcome {
        BatchOutcome::Completed(_) => println!("🎉 Completed in {:?}", start_time.elapsed()),
        BatchOutcome::Aborted { reason, .. } => {
            println!("🛑 Aborted after {:?}: {}", start_time.elapsed(), reason)
        }
    }

    Ok(())
}
