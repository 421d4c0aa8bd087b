//! # Locators
//!
//! Value types for locator handling: classified query expressions and the
//! per-node write-once locator cache.
//!
//! ## Module structure
//! - `query`: query expressions, confidence classification, path concatenation
//! - `record`: the raw / confident / generated locator slots of a node

pub mod query;
pub mod record;

pub use query::{Confidence, Query, Strategy};
pub use record::{LocatorRecord, RecordSnapshot};
