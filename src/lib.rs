//! Tocadiscos — audio session orchestrator
//!
//! Manages one ordered playback queue per isolated group, drives sequential
//! media streaming into a live audio sink, and arms an idle watchdog that
//! plays a short ambient clip and disconnects after sustained inactivity.
//!
//! The media resolver, audio sink, and notification channel are external
//! collaborators modeled as traits; see [`resolve`], [`sink`], and
//! [`notify`]. Everything else lives here: the per-group session registry,
//! the FIFO queue store, the playback driver, and the watchdog.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tocadiscos::{OrchestratorConfig, SessionManager};
//! # use tocadiscos::{notify::Notifier, resolve::MediaResolver, sink::SinkConnector};
//! # fn collaborators() -> (Arc<dyn MediaResolver>, Arc<dyn SinkConnector>, Arc<dyn Notifier>) {
//! #     unimplemented!()
//! # }
//!
//! let (resolver, connector, notifier) = collaborators();
//! let manager = SessionManager::new(
//!     OrchestratorConfig::default(),
//!     resolver,
//!     connector,
//!     notifier,
//! );
//! ```

pub mod ambient;
pub mod config;
pub mod error;
pub mod events;
pub mod manager;
pub mod notify;
pub mod resolve;
pub mod session;
pub mod sink;
pub mod track;

/// Identifier of one isolated playback group (one queue, one connection,
/// one watchdog).
pub type GroupId = u64;

pub use config::OrchestratorConfig;
pub use error::{Error, Result};
pub use manager::{SessionManager, SessionStatus};
pub use track::Track;
