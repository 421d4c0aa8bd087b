//! Context nodes
//!
//! A node is one addressable search context: the document root, an element,
//! or a composite region. Its parent link is an id into the session table.

use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::traits::Composite;
use crate::driver::{ElementHandle, SearchScope};
use crate::locator::{LocatorRecord, Query};

/// Identifier of a node in its session table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Element,
    Composite,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Root => "root",
            NodeKind::Element => "element",
            NodeKind::Composite => "composite",
        };
        f.write_str(name)
    }
}

/// What a node addresses
#[derive(Debug, Clone)]
pub enum Target {
    Root,
    Element,
    Composite(Arc<dyn Composite>),
}

/// Context node
#[derive(Debug)]
pub struct ContextNode {
    id: NodeId,
    target: Target,
    parent: Option<NodeId>,
    handle: OnceLock<ElementHandle>,
    record: LocatorRecord,
}

impl ContextNode {
    /// The document root. Its generated locator is the empty path.
    pub(crate) fn root(id: NodeId) -> Self {
        let record = LocatorRecord::new();
        record.cache_generated(Query::empty());

        Self {
            id,
            target: Target::Root,
            parent: None,
            handle: OnceLock::new(),
            record,
        }
    }

    pub(crate) fn element(
        id: NodeId,
        parent: Option<NodeId>,
        handle: Option<ElementHandle>,
        raw: Option<Query>,
    ) -> Self {
        let record = raw.map(LocatorRecord::with_raw).unwrap_or_default();
        Self::new(id, Target::Element, parent, handle, record)
    }

    /// One of several elements a single lookup matched
    pub(crate) fn shared_element(
        id: NodeId,
        parent: NodeId,
        handle: ElementHandle,
        raw: Query,
    ) -> Self {
        Self::new(
            id,
            Target::Element,
            Some(parent),
            Some(handle),
            LocatorRecord::shared(raw),
        )
    }

    pub(crate) fn composite(
        id: NodeId,
        parent: NodeId,
        raw: Query,
        composite: Arc<dyn Composite>,
    ) -> Self {
        Self::new(
            id,
            Target::Composite(composite),
            Some(parent),
            None,
            LocatorRecord::with_raw(raw),
        )
    }

    fn new(
        id: NodeId,
        target: Target,
        parent: Option<NodeId>,
        handle: Option<ElementHandle>,
        record: LocatorRecord,
    ) -> Self {
        let slot = OnceLock::new();
        if let Some(handle) = handle {
            slot.get_or_init(|| handle);
        }

        Self {
            id,
            target,
            parent,
            handle: slot,
            record,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn kind(&self) -> NodeKind {
        match self.target {
            Target::Root => NodeKind::Root,
            Target::Element => NodeKind::Element,
            Target::Composite(_) => NodeKind::Composite,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.target, Target::Root)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.target, Target::Element)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.target, Target::Composite(_))
    }

    /// Explicit parent, if one was given. `None` means the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn handle(&self) -> Option<&ElementHandle> {
        self.handle.get()
    }

    /// Whether the node can be searched under without a driver round trip
    pub fn is_resolved(&self) -> bool {
        self.is_root() || self.handle.get().is_some()
    }

    /// Scope for lookups under this node, if it is resolved
    pub fn search_scope(&self) -> Option<SearchScope> {
        match self.target {
            Target::Root => Some(SearchScope::Document),
            _ => self.handle().cloned().map(SearchScope::Element),
        }
    }

    pub fn record(&self) -> &LocatorRecord {
        &self.record
    }

    /// Bind the live handle; the first binding wins
    pub(crate) fn bind(&self, handle: ElementHandle) -> &ElementHandle {
        self.handle.get_or_init(|| handle)
    }

    /// Short description used in logs and errors
    pub fn describe(&self) -> String {
        match self.record.raw() {
            Some(raw) => format!("{} ({}, {})", self.id, self.kind(), raw),
            None => format!("{} ({})", self.id, self.kind()),
        }
    }
}
