//! The service reactor.
//!
//! # Lifecycle
//!
//! ```text
//! Service::configure(config, registry)
//!   ├─ resolve driver  (falls back to DummyDriver on any failure)
//!   └─ bind discipline (on failure: driver.shutdown(), return Bind error)
//! Service::run()
//!   ├─ loop: next_request → dispatch → acknowledge
//!   └─ termination: close discipline, driver.shutdown()   -- exactly once
//! ```
//!
//! `run` consumes the service, so teardown cannot be repeated or skipped.

use std::net::SocketAddr;

use fastevent_core::driver::{DriverRegistry, DummyDriver, OutputDriver};
use fastevent_core::ProtocolError;
use tracing::{error, info, warn};

use super::{
    Discipline, Incoming, Peer, ServiceError, TcpDiscipline, TransportKind, UdpDiscipline,
};
use crate::application::dispatch::{dispatch, Outcome};
use crate::infrastructure::storage::config::ServiceConfig;

/// Why [`Service::run`] returned.
#[derive(Debug)]
pub enum Termination {
    /// A client sent the shutdown command.
    Requested,
    /// A connectionless client sent bytes that are not a command.
    Protocol(ProtocolError),
    /// A socket failed.
    Fault(ServiceError),
}

/// One output driver served over one transport discipline.
pub struct Service {
    discipline: Box<dyn Discipline>,
    driver: Box<dyn OutputDriver>,
    verbose: bool,
}

impl Service {
    pub fn new(
        discipline: Box<dyn Discipline>,
        driver: Box<dyn OutputDriver>,
        verbose: bool,
    ) -> Self {
        Self {
            discipline,
            driver,
            verbose,
        }
    }

    /// Builds the driver named in `config` and binds the configured socket.
    ///
    /// A driver that cannot be built is replaced by a [`DummyDriver`], so
    /// the only fatal failure here is the socket.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Bind`] if the socket cannot be bound.  The
    /// driver has already been shut down in that case.
    pub async fn configure(
        config: &ServiceConfig,
        registry: &DriverRegistry,
    ) -> Result<Self, ServiceError> {
        if config.verbose {
            info!(
                "port={}, driver={}, transport={:?}",
                config.port, config.driver, config.transport
            );
        }

        let mut driver = select_driver(config, registry);
        let addr = SocketAddr::new(config.bind_address, config.port);

        let discipline: Result<Box<dyn Discipline>, ServiceError> = match config.transport {
            TransportKind::Tcp => TcpDiscipline::bind(addr, config.verbose)
                .map(|d| Box::new(d) as Box<dyn Discipline>),
            TransportKind::Udp => UdpDiscipline::bind(addr, config.verbose)
                .await
                .map(|d| Box::new(d) as Box<dyn Discipline>),
        };

        match discipline {
            Ok(discipline) => Ok(Self::new(discipline, driver, config.verbose)),
            Err(e) => {
                driver.shutdown();
                Err(e)
            }
        }
    }

    /// Serves requests until termination, then tears everything down.
    pub async fn run(mut self) -> Termination {
        let termination = loop {
            if let Some(termination) = self.turn().await {
                break termination;
            }
        };
        self.shutdown().await;
        termination
    }

    pub fn driver_identifier(&self) -> &'static str {
        self.driver.identifier()
    }

    pub fn kind(&self) -> TransportKind {
        self.discipline.kind()
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServiceError> {
        self.discipline.local_addr()
    }

    async fn turn(&mut self) -> Option<Termination> {
        let incoming = match self.discipline.next_request().await {
            Ok(incoming) => incoming,
            Err(e) => {
                error!("service error: {e}");
                return Some(Termination::Fault(e));
            }
        };

        match incoming {
            Incoming::Housekeeping => None,
            Incoming::Malformed { peer, error } => {
                warn!("malformed request: {error}");
                self.reject(peer, error).await
            }
            Incoming::Request { peer, request } => {
                match dispatch(self.driver.as_mut(), request) {
                    Outcome::Acknowledge => {
                        self.discipline.acknowledge(peer).await;
                        None
                    }
                    Outcome::Shutdown => {
                        self.discipline.acknowledge(peer).await;
                        if self.verbose {
                            info!("shutdown requested");
                        }
                        Some(Termination::Requested)
                    }
                    Outcome::Unrecognised(byte) => {
                        warn!("unknown command: 0x{byte:02X} ('{}')", byte.escape_ascii());
                        self.reject(peer, ProtocolError::UnknownCommand(byte)).await
                    }
                }
            }
        }
    }

    /// Acknowledges a request that could not be applied, then applies the
    /// transport's policy for such requests.
    async fn reject(&mut self, peer: Peer, error: ProtocolError) -> Option<Termination> {
        self.discipline.acknowledge(peer).await;
        if self.discipline.kind().unrecognised_is_fatal() {
            error!("terminating on invalid request: {error}");
            Some(Termination::Protocol(error))
        } else {
            None
        }
    }

    async fn shutdown(&mut self) {
        if self.verbose {
            info!("shutting down the server...");
        }
        self.discipline.close().await;
        self.driver.shutdown();
    }
}

/// Resolves the configured driver, substituting a [`DummyDriver`] when the
/// lookup or the driver's own setup fails.
pub fn select_driver(config: &ServiceConfig, registry: &DriverRegistry) -> Box<dyn OutputDriver> {
    match registry.resolve(&config.driver, &config.options, config.verbose) {
        Ok(driver) => driver,
        Err(e) => {
            error!("failed to initialize the output driver: {e}");
            error!("falling back to using a dummy output driver");
            Box::new(DummyDriver::setup(&config.options))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
