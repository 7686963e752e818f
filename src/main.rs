// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use the_conveyor::backends::local::{register_builtins, LocalResources};
use the_conveyor::config::load_and_validate_config;
use the_conveyor::engine::TaskGroup;
use the_conveyor::registry::Registry;

/// Run every task in a configuration file until its producers are exhausted or Ctrl-C.
#[derive(Parser, Debug)]
#[command(name = "the-conveyor", version, about, long_about = None)]
struct Args {
    /// Task configuration file (.yaml, .yml, .json or .toml)
    config: PathBuf,

    /// First id handed out by `sequence_id` stages with `shared: true`
    #[arg(long, default_value_t = 1)]
    sequence_start: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let args = Args::parse();

    let configs = load_and_validate_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let resources = LocalResources::new();
    resources.init_sequence(args.sequence_start, 1);
    let mut registry = Registry::new();
    register_builtins(&mut registry, &resources);

    let shutdown = CancellationToken::new();
    let group =
        Arc::new(TaskGroup::build(configs, &registry, &shutdown).context("building tasks")?);
    tracing::info!(tasks = group.len(), "starting");

    let mut runner = {
        let group = group.clone();
        tokio::spawn(async move { group.run_all().await })
    };

    tokio::select! {
        joined = &mut runner => joined.context("task group")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for Ctrl-C")?;
            tracing::info!("interrupt received, stopping tasks");
            group.stop_all();
            runner.await.context("task group")?;
        }
    }

    tracing::info!("all tasks terminated");
    Ok(())
}
