//! # Driver layer
//!
//! The boundary to the remote automation session. The resolver only talks to
//! a session through the [`Driver`] trait: find one, find all, and compute the
//! structural path of a live element.
//!
//! ## Module structure
//! - `traits`: the [`Driver`] trait, element handles and search scopes
//! - `mock`: a scripted in-memory driver that records every call

pub mod traits;
pub mod mock;

pub use traits::{Driver, ElementHandle, SearchScope};

pub use mock::{DriverCall, MockDriver};
