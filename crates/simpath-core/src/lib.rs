#![forbid(unsafe_code)]
//! simpath-core library.
//!
//! # Conventions
//!
//! - **Errors**: Domain failures are [`SimpathError`]; configuration loading
//!   uses `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod graph;

pub use config::SelectionConfig;
pub use error::{Result, SimpathError};
pub use graph::{InfluenceGraph, NodeId, SubgraphView};
