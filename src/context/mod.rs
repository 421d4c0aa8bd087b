//! # Context layer
//!
//! Search contexts and the resolution engine that decides the cheapest
//! correct query for every lookup.
//!
//! ## Core concepts
//! - **ContextTree**: the node table of one driver session, owning every node
//! - **ContextNode**: the document root, an element, or a composite region,
//!   with a parent id and a write-once locator cache
//! - **Resolution avoidance**: deriving an absolute locator from the cached
//!   locators of ancestors instead of resolving those ancestors first
//!
//! ## Module structure
//! - `traits`: the [`Composite`] trait for page-object-like regions
//! - `node`: context nodes and their kinds
//! - `tree`: the session table, node declaration and introspection
//! - `resolver`: lookup planning and execution
//!
//! ## Example
//! ```rust,no_run
//! use locator_context::context::ContextTree;
//! use locator_context::driver::Driver;
//! use locator_context::locator::Query;
//! use std::sync::Arc;
//!
//! # async fn example(driver: Arc<dyn Driver>) -> Result<(), Box<dyn std::error::Error>> {
//! let tree = ContextTree::new(driver);
//!
//! // Submitted as-is at the document root
//! let panel = tree.resolve(tree.root(), Query::xpath("//div[@id='panel']")).await?;
//!
//! // Submitted as //div[@id='panel']//button, still reported as .//button
//! let button = tree.resolve(panel, Query::xpath(".//button")).await?;
//! assert_eq!(tree.locator_of(button).await?, Query::xpath(".//button"));
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod node;
pub mod tree;
pub mod resolver;


pub use traits::Composite;
pub use node::{ContextNode, NodeId, NodeKind, Target};
pub use tree::ContextTree;
pub use resolver::{Lookup, Submission};
