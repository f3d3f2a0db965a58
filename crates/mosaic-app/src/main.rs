mod cli;
mod config;
mod sim;

use std::path::{Path, PathBuf};
use std::time::Duration;

use mosaic_store::MemoryStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::MosaicConfig;
use crate::sim::{SimulatedContext, StoreBackend};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("mosaic=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "mosaic=info".parse().unwrap()),
            ),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => match config::load_from_path(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                warn!("{e} — using defaults");
                MosaicConfig::default()
            }
        },
        None => config::load_default(),
    };
    config.apply_cli(&args);

    let store = match &args.store_file {
        Some(path) => StoreBackend::File(PathBuf::from(path)),
        None => StoreBackend::Memory(MemoryStore::new()),
    };

    run(config, store).await;
}

async fn run(config: MosaicConfig, store: StoreBackend) {
    let policy = config.policy();
    info!(
        windows = config.simulation.windows,
        tick_ms = policy.tick_ms(),
        staleness_ms = policy.staleness_ms(),
        "starting shared-scene simulation"
    );
    let mut contexts: Vec<SimulatedContext> = (0..config.simulation.windows)
        .map(|i| {
            SimulatedContext::open(
                &store,
                &format!("window-{}", i + 1),
                policy,
                &config.screen,
            )
        })
        .collect();

    let total = Duration::from_secs(config.simulation.duration_secs);
    let step = policy.tick_period;
    let mut elapsed = Duration::ZERO;
    let mut crashed = false;

    while elapsed < total {
        tokio::time::sleep(step).await;
        elapsed += step;

        for context in &contexts {
            context.drift(config.simulation.drift, &config.screen);
        }

        // Halfway through, one window vanishes without a departure signal
        // so the survivors demonstrate timeout eviction.
        if !crashed && elapsed >= total / 2 && contexts.len() > 1 {
            crashed = true;
            if let Some(victim) = contexts.pop() {
                victim.crash().await;
            }
        }
    }

    if let Some(context) = contexts.first() {
        info!(view = ?context.visible_labels(), "final window set");
    }
    for context in contexts {
        context.close().await;
    }
    info!("simulation finished");
}
