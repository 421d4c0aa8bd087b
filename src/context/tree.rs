//! Session-scoped context table
//!
//! Owns every node created during a driver session. Nodes refer to their
//! parent by [`NodeId`], so the table never holds reference cycles.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use super::node::{ContextNode, NodeId, NodeKind};
use super::traits::Composite;
use crate::config::Config;
use crate::driver::{Driver, ElementHandle};
use crate::locator::{Query, RecordSnapshot};
use crate::{Error, Result};

/// Context tree of one driver session
#[derive(Debug)]
pub struct ContextTree {
    pub(crate) driver: Arc<dyn Driver>,
    pub(crate) config: Config,
    nodes: RwLock<HashMap<NodeId, Arc<ContextNode>>>,
    next_id: AtomicU64,
    root: NodeId,
}

impl ContextTree {
    /// Create a tree over `driver` with the default configuration
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self::with_config(driver, Config::default())
    }

    /// Create a tree over `driver`
    pub fn with_config(driver: Arc<dyn Driver>, config: Config) -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, Arc::new(ContextNode::root(root)));

        Self {
            driver,
            config,
            nodes: RwLock::new(nodes),
            next_id: AtomicU64::new(1),
            root,
        }
    }

    /// The document root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Number of live nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.read().map(|n| n.len()).unwrap_or(0)
    }

    /// Get a node by id
    pub fn node(&self, id: NodeId) -> Result<Arc<ContextNode>> {
        self.nodes
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::node_not_found(id.to_string()))
    }

    pub(crate) fn insert<F>(&self, build: F) -> Result<NodeId>
    where
        F: FnOnce(NodeId) -> ContextNode,
    {
        let id = NodeId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let node = Arc::new(build(id));

        self.nodes
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(id, node);

        Ok(id)
    }

    /// Parent of `node`, defaulting to the root. The root is its own parent.
    pub(crate) fn parent_id(&self, node: &ContextNode) -> NodeId {
        node.parent().unwrap_or(self.root)
    }

    /// Parent of a node
    pub fn parent_of(&self, id: NodeId) -> Result<NodeId> {
        let node = self.node(id)?;
        Ok(self.parent_id(&node))
    }

    pub fn kind_of(&self, id: NodeId) -> Result<NodeKind> {
        Ok(self.node(id)?.kind())
    }

    pub fn is_resolved(&self, id: NodeId) -> Result<bool> {
        Ok(self.node(id)?.is_resolved())
    }

    /// Snapshot of a node's locator slots
    pub fn record_of(&self, id: NodeId) -> Result<RecordSnapshot> {
        Ok(self.node(id)?.record().snapshot())
    }

    /// Declare an element under `parent` without looking it up.
    ///
    /// The element is found on first use by resolving `query` under `parent`.
    pub fn declare(&self, parent: NodeId, query: Query) -> Result<NodeId> {
        self.node(parent)?;
        self.insert(|id| ContextNode::element(id, Some(parent), None, Some(query)))
    }

    /// Declare a composite region rooted at the element `query` finds under
    /// `parent`
    pub fn declare_composite(
        &self,
        parent: NodeId,
        query: Query,
        composite: Arc<dyn Composite>,
    ) -> Result<NodeId> {
        self.node(parent)?;
        self.insert(|id| ContextNode::composite(id, parent, query, composite))
    }

    /// Wrap an externally obtained handle
    pub fn wrap(
        &self,
        handle: ElementHandle,
        parent: Option<NodeId>,
        locator: Option<Query>,
    ) -> Result<NodeId> {
        match parent {
            Some(parent) => {
                self.node(parent)?;
            }
            None => warn!("Wrapping element {} with the document root as parent", handle),
        }

        self.insert(|id| ContextNode::element(id, parent, Some(handle), locator))
    }

    /// Remove a node and all of its descendants. Returns the number removed.
    pub fn release(&self, id: NodeId) -> Result<usize> {
        if id == self.root {
            return Err(Error::internal("The root node cannot be released"));
        }

        let mut nodes = self
            .nodes
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        if !nodes.contains_key(&id) {
            return Err(Error::node_not_found(id.to_string()));
        }

        let mut doomed = HashSet::from([id]);
        loop {
            let before = doomed.len();
            for (node_id, node) in nodes.iter() {
                if let Some(parent) = node.parent() {
                    if doomed.contains(&parent) {
                        doomed.insert(*node_id);
                    }
                }
            }
            if doomed.len() == before {
                break;
            }
        }

        nodes.retain(|node_id, _| !doomed.contains(node_id));
        debug!("Released {} nodes under {}", doomed.len(), id);

        Ok(doomed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;

    fn tree() -> ContextTree {
        ContextTree::new(Arc::new(MockDriver::new()))
    }

    #[test]
    fn test_tree_starts_with_root() {
        let tree = tree();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.kind_of(tree.root()).unwrap(), NodeKind::Root);
        assert_eq!(tree.parent_of(tree.root()).unwrap(), tree.root());
        assert!(tree.is_resolved(tree.root()).unwrap());
    }

    #[test]
    fn test_declare_keeps_node_unresolved() {
        let tree = tree();
        let table = tree.declare(tree.root(), Query::xpath(".//table")).unwrap();

        assert_eq!(tree.parent_of(table).unwrap(), tree.root());
        assert!(!tree.is_resolved(table).unwrap());
        assert_eq!(tree.record_of(table).unwrap().raw, Some(Query::xpath(".//table")));
    }

    #[test]
    fn test_declare_under_unknown_parent_fails() {
        let tree = tree();
        let result = tree.declare(NodeId(42), Query::xpath("./a"));
        assert!(matches!(result, Err(Error::NodeNotFound(_))));
    }

    #[test]
    fn test_wrap_defaults_parent_to_root() {
        let tree = tree();
        let node = tree.wrap(ElementHandle::new("el-9"), None, None).unwrap();

        assert_eq!(tree.parent_of(node).unwrap(), tree.root());
        assert!(tree.is_resolved(node).unwrap());
        assert_eq!(tree.record_of(node).unwrap().raw, None);
    }

    #[test]
    fn test_release_removes_descendants() {
        let tree = tree();
        let table = tree.declare(tree.root(), Query::xpath(".//table")).unwrap();
        let body = tree.declare(table, Query::xpath("./tbody")).unwrap();
        let row = tree.declare(body, Query::xpath("./tr[1]")).unwrap();
        let header = tree.declare(tree.root(), Query::id("header")).unwrap();

        assert_eq!(tree.release(body).unwrap(), 2);
        assert!(tree.node(row).is_err());
        assert!(tree.node(table).is_ok());
        assert!(tree.node(header).is_ok());
        assert_eq!(tree.node_count(), 3);

        assert!(tree.release(tree.root()).is_err());
        assert!(matches!(tree.release(body), Err(Error::NodeNotFound(_))));
    }
}
