//! Driver layer traits
//!
//! The capabilities the resolver consumes from a remote automation session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::Query;

/// Opaque reference to a remote document element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    /// Wrap a driver-issued element id
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Driver-issued element id
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a driver lookup is evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SearchScope {
    /// The document root
    Document,
    /// Under a live element
    Element(ElementHandle),
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchScope::Document => f.write_str("document"),
            SearchScope::Element(handle) => write!(f, "element {}", handle),
        }
    }
}

/// Driver facade trait
///
/// A remote session able to locate elements. Calls are issued one at a time
/// per session; timeouts and waiting belong to the implementation.
#[async_trait]
pub trait Driver: Send + Sync + fmt::Debug {
    /// Find the first element matching `query` in `scope`.
    ///
    /// Fails with [`crate::Error::NotFound`] when nothing matches.
    async fn find(&self, query: &Query, scope: &SearchScope) -> Result<ElementHandle, crate::Error>;

    /// Find all elements matching `query` in `scope`; no match is an empty list
    async fn find_all(&self, query: &Query, scope: &SearchScope) -> Result<Vec<ElementHandle>, crate::Error>;

    /// Compute the structural path of a live element
    async fn compute_path(&self, handle: &ElementHandle) -> Result<Query, crate::Error>;
}
