//! Resolution engine
//!
//! Decides, for a lookup of `query` under a scope node, which expression to
//! send to the driver and where to evaluate it.
//!
//! With resolution avoidance enabled (the default) the policy is:
//!
//! 1. A Confident query goes straight to the document root. The scope is
//!    recorded as the parent of the result but is never resolved.
//! 2. A query without a path form is searched under the live scope handle.
//! 3. A relative path is appended to the scope's generated locator, else to
//!    its confident locator, else to a locator derived by walking the
//!    ancestors' cached locators. If the result is Confident it is sent to the
//!    document root; otherwise the original query is searched under the live
//!    scope handle instead.
//!
//! Concatenating two relative paths does not prove the result is unique: a
//! header row path under `//table[@class='header']` may equally match a row of
//! another table. Only a Confident concatenation is ever sent to the root.

use async_recursion::async_recursion;
use tracing::{debug, instrument, trace, warn};

use super::node::{ContextNode, NodeId, Target};
use super::tree::ContextTree;
use crate::driver::{ElementHandle, SearchScope};
use crate::locator::Query;
use crate::{Error, Result};

/// Where a planned lookup is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Evaluate the query against the document root
    Document(Query),
    /// Evaluate the query under the live handle of the scope node
    Scoped(Query),
}

/// A planned lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub submission: Submission,
    /// Parent of the node the lookup produces
    pub parent: NodeId,
}

impl Lookup {
    fn document(query: Query, parent: NodeId) -> Self {
        Self {
            submission: Submission::Document(query),
            parent,
        }
    }

    fn scoped(query: Query, parent: NodeId) -> Self {
        Self {
            submission: Submission::Scoped(query),
            parent,
        }
    }

    /// Query sent to the driver
    pub fn query(&self) -> &Query {
        match &self.submission {
            Submission::Document(query) | Submission::Scoped(query) => query,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self.submission, Submission::Document(_))
    }
}

/// Name the requested query and the scope node in a driver miss
fn name_miss(err: Error, query: &Query, scope: &ContextNode) -> Error {
    match err {
        Error::NotFound { query: submitted, .. } if submitted != query.to_string() => {
            Error::not_found(format!("{} (submitted as {})", query, submitted), scope.describe())
        }
        Error::NotFound { .. } => Error::not_found(query.to_string(), scope.describe()),
        other => other,
    }
}

impl ContextTree {
    /// Find the first element matching `query` under `scope`.
    ///
    /// The new node's locator is `query` itself, never the expression that was
    /// actually submitted.
    #[instrument(skip(self))]
    pub async fn resolve(&self, scope: NodeId, query: Query) -> Result<NodeId> {
        let node = self.node(scope)?;
        let lookup = self.plan_for(&node, &query).await?;
        let search = self.search_scope_for(&node, &lookup).await?;

        let handle = self
            .driver
            .find(lookup.query(), &search)
            .await
            .map_err(|e| name_miss(e, &query, &node))?;

        debug!("Resolved {} under {} as element {}", query, node.describe(), handle);
        self.insert(|id| ContextNode::element(id, Some(lookup.parent), Some(handle), Some(query)))
    }

    /// Find all elements matching `query` under `scope`. No match is an empty
    /// list, not an error.
    ///
    /// When several elements match, `query` no longer identifies any one of
    /// them: lookups under the results use their structural paths instead.
    #[instrument(skip(self))]
    pub async fn resolve_all(&self, scope: NodeId, query: Query) -> Result<Vec<NodeId>> {
        let node = self.node(scope)?;
        let lookup = self.plan_for(&node, &query).await?;
        let search = self.search_scope_for(&node, &lookup).await?;

        let handles = self
            .driver
            .find_all(lookup.query(), &search)
            .await
            .map_err(|e| name_miss(e, &query, &node))?;

        debug!("Resolved {} elements for {} under {}", handles.len(), query, node.describe());
        let shared = handles.len() > 1;
        handles
            .into_iter()
            .map(|handle| {
                let raw = query.clone();
                if shared {
                    self.insert(|id| ContextNode::shared_element(id, lookup.parent, handle, raw))
                } else {
                    self.insert(|id| ContextNode::element(id, Some(lookup.parent), Some(handle), Some(raw)))
                }
            })
            .collect()
    }

    /// Plan a lookup without submitting it.
    ///
    /// Planning may fill locator caches, and in eager mode may resolve the
    /// scope to compute its structural path.
    pub async fn plan(&self, scope: NodeId, query: &Query) -> Result<Lookup> {
        let node = self.node(scope)?;
        self.plan_for(&node, query).await
    }

    /// The locator a node was created with.
    ///
    /// A node wrapped without a locator adopts its confident locator.
    pub async fn locator_of(&self, id: NodeId) -> Result<Query> {
        let node = self.node(id)?;
        if let Some(raw) = node.record().raw() {
            return Ok(raw.clone());
        }

        if self.config.warn_on_raw_locator_fallback {
            warn!("{} has no locator, falling back to confident/generated", node.describe());
        }
        let confident = self.confident_locator_of(&node).await?;
        Ok(node.record().cache_raw(confident).clone())
    }

    /// Self-sufficient locator of a node, computing its structural path when
    /// nothing better is known
    pub async fn confident_locator(&self, id: NodeId) -> Result<Query> {
        let node = self.node(id)?;
        self.confident_locator_of(&node).await
    }

    /// Absolute locator of a node: an ancestor walk when resolution avoidance
    /// is enabled, the structural path of its live handle otherwise or when the
    /// node was one of several matches
    pub async fn generated_locator(&self, id: NodeId) -> Result<Query> {
        let node = self.node(id)?;
        if self.config.resolution_avoidance && !node.record().is_shared() {
            self.escalate(&node)
        } else {
            self.structural_locator(&node).await
        }
    }

    /// Resolve a node if needed and return the scope for lookups under it
    #[instrument(skip(self))]
    pub async fn realize(&self, id: NodeId) -> Result<SearchScope> {
        let node = self.node(id)?;
        self.search_scope_of(&node).await
    }

    /// Resolve a non-root node if needed and return its handle
    #[instrument(skip(self))]
    pub async fn handle_of(&self, id: NodeId) -> Result<ElementHandle> {
        let node = self.node(id)?;
        self.realize_element(&node).await
    }

    pub(crate) async fn plan_for(&self, scope: &ContextNode, query: &Query) -> Result<Lookup> {
        if self.config.resolution_avoidance {
            self.plan_avoiding(scope, query).await
        } else {
            self.plan_eager(scope, query).await
        }
    }

    async fn plan_avoiding(&self, scope: &ContextNode, query: &Query) -> Result<Lookup> {
        let parent = scope.id();

        if query.is_confident() {
            return Ok(Lookup::document(query.clone(), parent));
        }

        if !query.is_path_expressible() {
            debug!("{} has no path form, searching under {}", query, scope.describe());
            return Ok(Lookup::scoped(query.clone(), parent));
        }

        let record = scope.record();
        if scope.is_resolved() && !record.has_generated() && !record.has_confident() {
            // Resolved elsewhere before its generated form was ever asked for.
            if let Err(e) = self.structural_locator(scope).await {
                warn!("Cannot compute the path of {}: {}", scope.describe(), e);
                return Ok(Lookup::scoped(query.clone(), parent));
            }
        }

        let anchor = match record.generated().or_else(|| record.confident()) {
            Some(anchor) => anchor.clone(),
            None => match self.escalate(scope) {
                Ok(generated) => generated,
                Err(e @ (Error::UnsupportedConcatenation(_) | Error::LocatorGeneration(_))) => {
                    warn!("Cannot derive a locator for {}: {}", scope.describe(), e);
                    return Ok(Lookup::scoped(query.clone(), parent));
                }
                Err(e) => return Err(e),
            },
        };

        match anchor.concat(query) {
            Ok(effective) if effective.is_confident() => {
                trace!("{} under {} becomes {}", query, scope.describe(), effective);
                Ok(Lookup::document(effective, parent))
            }
            Ok(effective) => {
                warn!(
                    "{} is not self-sufficient, searching {} under {}",
                    effective,
                    query,
                    scope.describe()
                );
                Ok(Lookup::scoped(query.clone(), parent))
            }
            Err(e) => {
                warn!("{}, searching {} under {}", e, query, scope.describe());
                Ok(Lookup::scoped(query.clone(), parent))
            }
        }
    }

    async fn plan_eager(&self, scope: &ContextNode, query: &Query) -> Result<Lookup> {
        if query.is_confident() {
            return Ok(Lookup::document(query.clone(), self.root()));
        }

        if query.is_path_expressible() {
            let anchor = self.confident_locator_of(scope).await?;
            match anchor.concat(query) {
                Ok(effective) => return Ok(Lookup::document(effective, scope.id())),
                Err(e) => debug!("{}, searching under {}", e, scope.describe()),
            }
        }

        Ok(Lookup::scoped(query.clone(), scope.id()))
    }

    /// Derive an absolute locator from cached ancestor locators only.
    ///
    /// Walks up from the node, prefixing each ancestor's generated, confident
    /// or raw locator, until the result is Confident or the root's empty
    /// prefix has been applied. Issues no driver calls.
    pub(crate) fn escalate(&self, node: &ContextNode) -> Result<Query> {
        let record = node.record();
        if let Some(generated) = record.generated() {
            return Ok(generated.clone());
        }

        let mut locator = record
            .own_raw()
            .or_else(|| record.confident())
            .cloned()
            .ok_or_else(|| {
                Error::locator_generation(format!("{} has no locator to start from", node.describe()))
            })?;

        let mut ancestor = self.node(self.parent_id(node))?;
        while !locator.is_confident() {
            let prefix = ancestor.record().best_known().cloned().ok_or_else(|| {
                Error::locator_generation(format!("{} has no locator", ancestor.describe()))
            })?;
            locator = prefix.concat(&locator)?;

            if ancestor.is_root() {
                break;
            }
            ancestor = self.node(self.parent_id(&ancestor))?;
        }

        trace!("Generated {} for {}", locator, node.describe());
        Ok(record.cache_generated(locator).clone())
    }

    /// Structural path of the node's live handle. An unresolved composite is
    /// resolved first; an unresolved element cannot be handled this way.
    pub(crate) async fn structural_locator(&self, node: &ContextNode) -> Result<Query> {
        if let Some(generated) = node.record().generated() {
            return Ok(generated.clone());
        }

        let handle = match (node.target(), node.handle()) {
            (Target::Root, _) => return Ok(node.record().cache_generated(Query::empty()).clone()),
            (_, Some(handle)) => handle.clone(),
            (Target::Composite(_), None) => self.realize_element(node).await?,
            (Target::Element, None) => {
                return Err(Error::locator_generation(format!(
                    "{} has no live handle",
                    node.describe()
                )))
            }
        };

        let path = self.driver.compute_path(&handle).await?;
        Ok(node.record().cache_generated(path).clone())
    }

    pub(crate) async fn confident_locator_of(&self, node: &ContextNode) -> Result<Query> {
        // The empty path anchors children of the root but is not Confident itself
        if node.is_root() {
            return Ok(Query::empty());
        }

        let record = node.record();
        if let Some(confident) = record.confident() {
            return Ok(confident.clone());
        }
        if let Some(confident) = record.confident_from_raw() {
            return Ok(confident.clone());
        }

        let generated = self.structural_locator(node).await?;
        Ok(record.cache_confident(generated).clone())
    }

    async fn search_scope_for(&self, node: &ContextNode, lookup: &Lookup) -> Result<SearchScope> {
        match lookup.submission {
            Submission::Document(_) => Ok(SearchScope::Document),
            Submission::Scoped(_) => self.search_scope_of(node).await,
        }
    }

    async fn search_scope_of(&self, node: &ContextNode) -> Result<SearchScope> {
        match node.target() {
            Target::Root => Ok(SearchScope::Document),
            _ => Ok(SearchScope::Element(self.realize_element(node).await?)),
        }
    }

    /// Bind a live handle to a non-root node, resolving its own locator under
    /// its parent when needed, and initialise a composite once bound.
    #[async_recursion]
    pub(crate) async fn realize_element(&self, node: &ContextNode) -> Result<ElementHandle> {
        if node.is_root() {
            return Err(Error::internal("The document root has no element handle"));
        }

        let handle = match node.handle() {
            Some(handle) => handle.clone(),
            None => {
                let raw = node.record().raw().cloned().ok_or_else(|| {
                    Error::locator_generation(format!("{} has no handle and no locator", node.describe()))
                })?;
                let parent = self.node(self.parent_id(node))?;
                debug!("Resolving {} under {}", node.describe(), parent.describe());

                let lookup = self.plan_for(&parent, &raw).await?;
                let search = self.search_scope_for(&parent, &lookup).await?;
                let found = self
                    .driver
                    .find(lookup.query(), &search)
                    .await
                    .map_err(|e| name_miss(e, &raw, &parent))?;

                node.bind(found).clone()
            }
        };

        if let Target::Composite(composite) = node.target() {
            if !composite.is_initialized() {
                debug!("Initializing composite {}", node.describe());
                composite.initialize(&handle).await?;
            }
        }

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use std::sync::Arc;

    #[test]
    fn test_lookup_query() {
        let lookup = Lookup::document(Query::xpath("//a"), NodeId(0));
        assert!(lookup.is_document());
        assert_eq!(lookup.query(), &Query::xpath("//a"));

        let lookup = Lookup::scoped(Query::css("a"), NodeId(4));
        assert!(!lookup.is_document());
        assert_eq!(lookup.parent, NodeId(4));
    }

    #[test]
    fn test_name_miss_mentions_both_queries() {
        let node = ContextNode::element(NodeId(5), None, None, Some(Query::id("grid")));
        let err = name_miss(
            Error::not_found("xpath=//*[@id='grid']//tr", "document"),
            &Query::xpath(".//tr"),
            &node,
        );

        let message = err.to_string();
        assert!(message.contains("xpath=.//tr"));
        assert!(message.contains("submitted as xpath=//*[@id='grid']//tr"));
        assert!(message.contains("node#5"));
    }

    #[test]
    fn test_name_miss_passes_other_errors() {
        let node = ContextNode::element(NodeId(5), None, None, None);
        let err = name_miss(Error::driver("gone"), &Query::xpath(".//tr"), &node);
        assert!(matches!(err, Error::Driver(_)));
    }

    #[test]
    fn test_escalate_stops_at_confident_ancestor() {
        let tree = ContextTree::new(Arc::new(MockDriver::new()));
        let grid = tree.declare(tree.root(), Query::id("grid")).unwrap();
        let body = tree.declare(grid, Query::xpath("./tbody")).unwrap();
        let row = tree.declare(body, Query::xpath("./tr[3]")).unwrap();

        let node = tree.node(row).unwrap();
        let generated = tree.escalate(&node).unwrap();
        assert_eq!(generated.value(), "//*[@id='grid']/tbody/tr[3]");
        assert_eq!(node.record().generated(), Some(&generated));

        // Intermediate ancestors are left alone
        assert!(!tree.node(body).unwrap().record().has_generated());
    }

    #[test]
    fn test_escalate_prefers_cached_ancestor_locators() {
        let tree = ContextTree::new(Arc::new(MockDriver::new()));
        let table = tree.declare(tree.root(), Query::xpath(".//table")).unwrap();
        let body = tree.declare(table, Query::xpath("./tbody")).unwrap();
        let row = tree.declare(body, Query::xpath("./tr[1]")).unwrap();

        tree.node(body)
            .unwrap()
            .record()
            .cache_generated(Query::xpath("/html/body/table[2]/tbody"));

        let generated = tree.escalate(&tree.node(row).unwrap()).unwrap();
        assert_eq!(generated.value(), "/html/body/table[2]/tbody/tr[1]");
    }

    #[test]
    fn test_escalate_without_locator_fails() {
        let tree = ContextTree::new(Arc::new(MockDriver::new()));
        let bare = tree.wrap(ElementHandle::new("el-1"), None, None).unwrap();
        let child = tree.declare(bare, Query::xpath("./span")).unwrap();

        let err = tree.escalate(&tree.node(child).unwrap()).unwrap_err();
        assert!(matches!(err, Error::LocatorGeneration(_)));
        assert!(!tree.node(child).unwrap().record().has_generated());
    }
}
