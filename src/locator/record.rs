//! Per-node locator cache
//!
//! Three independent write-once slots: the locator a node was created with
//! (`raw`), the cheapest self-sufficient locator known for it (`confident`), and
//! the absolute locator derived from its ancestors or its live handle
//! (`generated`). A slot goes from unset to cached exactly once; concurrent
//! writers race benignly and the first value wins.
//!
//! A record is *shared* when its raw locator matched several elements at once.
//! Such a raw locator names the node only together with a position, so it is
//! never used as a confident anchor or as a prefix for descendants.

use serde::Serialize;
use std::sync::OnceLock;

use super::query::Query;
use crate::{Error, Result};

/// Locator cache owned by a single context node
#[derive(Debug, Default)]
pub struct LocatorRecord {
    raw: OnceLock<Query>,
    confident: OnceLock<Query>,
    generated: OnceLock<Query>,
    shared: bool,
}

/// Point-in-time copy of a [`LocatorRecord`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSnapshot {
    pub raw: Option<Query>,
    pub confident: Option<Query>,
    pub generated: Option<Query>,
}

impl LocatorRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record seeded with a raw locator
    pub fn with_raw(raw: Query) -> Self {
        let record = Self::new();
        // Fresh record, the slot is empty.
        let _ = record.set(raw);
        record
    }

    /// Create a record for one of several elements matched by `raw`
    pub fn shared(raw: Query) -> Self {
        let record = Self {
            shared: true,
            ..Self::default()
        };
        let _ = record.set(raw);
        record
    }

    /// Store the raw locator; a Confident one also becomes the confident anchor
    /// unless the record is shared
    pub fn set(&self, raw: Query) -> Result<()> {
        let confident = (raw.is_confident() && !self.shared).then(|| raw.clone());

        self.raw
            .set(raw)
            .map_err(|rejected| Error::locator_already_set(rejected.to_string()))?;

        if let Some(confident) = confident {
            self.confident.get_or_init(|| confident);
        }

        Ok(())
    }

    pub fn raw(&self) -> Option<&Query> {
        self.raw.get()
    }

    pub fn confident(&self) -> Option<&Query> {
        self.confident.get()
    }

    pub fn generated(&self) -> Option<&Query> {
        self.generated.get()
    }

    /// Whether the raw locator matched several elements
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn has(&self) -> bool {
        self.raw.get().is_some()
    }

    pub fn has_confident(&self) -> bool {
        self.confident.get().is_some()
    }

    pub fn has_generated(&self) -> bool {
        self.generated.get().is_some()
    }

    /// The raw locator when it is Confident, caching it as the anchor
    pub fn confident_from_raw(&self) -> Option<&Query> {
        let raw = self.own_raw().filter(|raw| raw.is_confident())?;
        Some(self.confident.get_or_init(|| raw.clone()))
    }

    /// Raw locator, if it addresses this node alone
    pub fn own_raw(&self) -> Option<&Query> {
        self.raw.get().filter(|_| !self.shared)
    }

    /// Best locator available without deriving anything: generated, then
    /// confident, then raw. The raw locator of a shared record is skipped.
    pub fn best_known(&self) -> Option<&Query> {
        self.generated()
            .or_else(|| self.confident())
            .or_else(|| self.own_raw())
    }

    pub(crate) fn cache_raw(&self, raw: Query) -> &Query {
        self.raw.get_or_init(|| raw)
    }

    pub(crate) fn cache_confident(&self, confident: Query) -> &Query {
        self.confident.get_or_init(|| confident)
    }

    pub(crate) fn cache_generated(&self, generated: Query) -> &Query {
        self.generated.get_or_init(|| generated)
    }

    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            raw: self.raw().cloned(),
            confident: self.confident().cloned(),
            generated: self.generated().cloned(),
        }
    }
}
