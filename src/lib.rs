//! Explorer server - a read-only HTTP query front end for a blockchain node.
//!
//! The server exposes a fixed set of routes (`status`, `block`, `blocks`,
//! `hdrs`, `peers`, `swap_offers`, `swap_totals`, `contracts`, `contract`,
//! `asset`, `assets`). Each request is answered by one backend query whose
//! document is rendered in one of three ways:
//!
//! - passthrough JSON (default)
//! - JSON with `amount` nodes expanded into decimal strings (`exp_am`)
//! - a browsable HTML page built from the same tree (`htm`)
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use explorer_server::{
//!     AccessList, ExplorerHandler, ExplorerServer, HttpServer, ServerSettings, UpstreamAdapter,
//!     config::load_config,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let cfg = load_config("explorer.toml").await?;
//! let upstream = cfg.upstream.clone().ok_or_else(|| eyre::eyre!("no upstream"))?;
//! let backend = Arc::new(UpstreamAdapter::new(&upstream)?);
//! let access_list = Arc::new(AccessList::load(cfg.access_list_path.clone()).await);
//! let handler = Arc::new(ExplorerHandler::new(
//!     backend,
//!     access_list.clone(),
//!     explorer_server::core::Renderer::new(cfg.render_options()),
//! ));
//! let server = ExplorerServer::new(
//!     handler,
//!     access_list,
//!     ServerSettings::from_config(&cfg)?,
//!     CancellationToken::new(),
//! );
//! server.run().await?;
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! **Ports** (traits) are separated from **adapters** (implementations), with
//! routing, rendering and access control in `core`. The backend is reached
//! only through [`ports::adapter::ExplorerAdapter`]; [`UpstreamAdapter`]
//! relays queries to a node-side endpoint over HTTP.
//!
//! # Error Handling
//! Request failures are typed (`RequestError`, `AdapterError`, `RenderError`)
//! and turned into status codes at one boundary. Startup paths return
//! `eyre::Result` with `WrapErr` context.
pub mod config;
pub mod ports;
pub mod tracing_setup;
pub mod utils;

pub mod adapters;
pub mod core;

// Re-export the specific types needed by the binary crate
pub use crate::{
    adapters::{ExplorerHandler, ExplorerServer, ServerSettings, UpstreamAdapter},
    core::AccessList,
    ports::{adapter::ExplorerAdapter, http_server::HttpServer},
    utils::GracefulShutdown,
};
