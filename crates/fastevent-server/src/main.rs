//! FastEvent trigger server entry point.
//!
//! ```text
//! main()
//!  └─ load_config(path)            -- first CLI argument, default service.toml
//!  └─ init tracing                 -- RUST_LOG, else config log_level
//!  └─ register_builtin_drivers()
//!  └─ Service::configure()         -- driver (with dummy fallback) + socket
//!  └─ Service::run()               -- until shutdown command or fault
//! ```
//!
//! Exit code `1` means the service never started; every run that reaches
//! the serving loop exits with `0`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use fastevent_core::DriverRegistry;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use fastevent_server::infrastructure::drivers::register_builtin_drivers;
use fastevent_server::infrastructure::network::{Service, Termination};
use fastevent_server::infrastructure::storage::config::{load_config, DEFAULT_CONFIG_FILE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet; use the default filter to report.
            init_tracing("info");
            return Err(e).with_context(|| format!("failed to load config file {}", path.display()));
        }
    };
    init_tracing(&config.log_level);
    info!("FastEvent server starting with {}", path.display());

    let mut registry = DriverRegistry::new();
    register_builtin_drivers(&mut registry);

    let service = Service::configure(&config, &registry)
        .await
        .context("failed to set up the service")?;
    info!(
        "serving {:?} on {} with the '{}' driver",
        service.kind(),
        service
            .local_addr()
            .map_or_else(|_| config.port.to_string(), |a| a.to_string()),
        service.driver_identifier()
    );

    match service.run().await {
        Termination::Requested => info!("FastEvent server stopped"),
        Termination::Protocol(e) => warn!("FastEvent server stopped on invalid request: {e}"),
        Termination::Fault(e) => error!("FastEvent server stopped after a socket fault: {e}"),
    }
    Ok(())
}

/// Initialises structured logging.  `RUST_LOG` overrides `fallback`.
fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(fallback))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
