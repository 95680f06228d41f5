//! HTTP server module with TLS support.
//!
//! Two listener modes:
//! - **None (default)**: Plain HTTP - the probe normally binds a pod-local
//!   port behind an orchestrator
//! - **Manual**: User-provided certificate and key files
//!
//! The server includes:
//! - Graceful shutdown on SIGTERM/SIGINT
//! - Certificate hot-reload via SIGHUP (manual mode)

mod server;
mod shutdown;

pub use server::start_server;
