//! Locator-context: lazy element resolution for browser automation
//!
//! This library keeps a tree of search contexts over a remote automation
//! session and decides, for each element lookup, whether it can be sent to the
//! document root as a self-sufficient expression or has to be evaluated under a
//! live element handle. Ancestors are only resolved when no such expression can
//! be derived.

pub mod error;
pub mod config;
pub mod telemetry;

pub mod locator;
pub mod driver;
pub mod context;

// Re-exports
pub use error::{Error, Result};
pub use config::Config;
pub use locator::{Confidence, Query, Strategy};
pub use driver::{Driver, ElementHandle, SearchScope};
pub use context::{Composite, ContextTree, NodeId, NodeKind};

/// Locator-context library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
