//! Context layer traits

use async_trait::async_trait;

use crate::driver::ElementHandle;

/// Composite region trait
///
/// Implemented by page-object-like collaborators that group elements under a
/// root element of their own. The resolver binds the composite's root element
/// on demand and then asks it to initialise itself.
#[async_trait]
pub trait Composite: Send + Sync + std::fmt::Debug {
    /// Whether the composite has already been initialised
    fn is_initialized(&self) -> bool;

    /// Initialise the composite once its root element is known
    async fn initialize(&self, root: &ElementHandle) -> Result<(), crate::Error>;
}
