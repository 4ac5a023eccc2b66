//! Student advisor binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialise tracing
//! 3. Train the intent classifier and build the advisor
//! 4. Sweep idle sessions in the background
//! 5. Serve the HTTP API until Ctrl-C

mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use advisor_api::routes;
use advisor_api::state::AppState;
use advisor_chat::{AdvisorOrchestrator, OpenAiGenerator, TextGenerator};
use advisor_core::config::AdvisorConfig;

use crate::cli::CliArgs;

const SESSION_SWEEP_SECS: u64 = 60;

/// Periodically drop sessions that passed their idle timeout.
async fn session_sweep_loop(advisor: Arc<AdvisorOrchestrator>, interval_secs: u64) {
    tracing::info!(interval_secs, "Session sweep started");
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;
        let evicted = advisor.sessions().evict_idle();
        if evicted > 0 {
            tracing::debug!(evicted, "Session sweep finished");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the configured level can seed the filter.
    let config_file = args.resolve_config_path();
    let config_found = config_file.exists();
    let mut config = if config_found {
        AdvisorConfig::load(&config_file)?
    } else {
        AdvisorConfig::default()
    };
    args.apply_overrides(&mut config);

    // Tracing. RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting student advisor v{}", env!("CARGO_PKG_VERSION"));
    if config_found {
        tracing::info!(path = %config_file.display(), "Configuration loaded");
    } else {
        tracing::info!(path = %config_file.display(), "No configuration file; using defaults");
    }

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    // Advisor.
    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiGenerator::from_config(&config.llm));
    let advisor = match AdvisorOrchestrator::from_config(&config, generator) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise the advisor");
            return Err(e.into());
        }
    };

    // API server.
    let state = AppState::new(config.clone(), advisor);

    if state.advisor.sessions().idle_timeout().is_some() {
        let sweeper = Arc::clone(&state.advisor);
        tokio::spawn(async move {
            session_sweep_loop(sweeper, SESSION_SWEEP_SECS).await;
        });
    }
    if let Err(e) = routes::start_server(&config, state).await {
        tracing::error!(error = %e, "API server failed");
        tracing::error!(
            "Try another port: student-advisor --port {}",
            config.general.port.saturating_add(1)
        );
        return Err(e.into());
    }

    Ok(())
}
