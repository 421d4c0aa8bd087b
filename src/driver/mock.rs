//! Mock driver implementation for testing
//!
//! A scripted driver: lookups answer from a table of registered
//! `(query, scope)` pairs and every call is recorded in order.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::traits::{Driver, ElementHandle, SearchScope};
use crate::locator::Query;
use crate::Error;

/// A call received by [`MockDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Find { query: Query, scope: SearchScope },
    FindAll { query: Query, scope: SearchScope },
    ComputePath { handle: ElementHandle },
}

impl DriverCall {
    /// Query submitted by a lookup call
    pub fn query(&self) -> Option<&Query> {
        match self {
            DriverCall::Find { query, .. } | DriverCall::FindAll { query, .. } => Some(query),
            DriverCall::ComputePath { .. } => None,
        }
    }

    /// Scope of a lookup call
    pub fn scope(&self) -> Option<&SearchScope> {
        match self {
            DriverCall::Find { scope, .. } | DriverCall::FindAll { scope, .. } => Some(scope),
            DriverCall::ComputePath { .. } => None,
        }
    }
}

/// Mock driver
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    elements: Arc<RwLock<HashMap<(Query, SearchScope), Vec<ElementHandle>>>>,
    paths: Arc<RwLock<HashMap<ElementHandle, Query>>>,
    calls: Arc<RwLock<Vec<DriverCall>>>,
}

impl MockDriver {
    /// Create a new mock driver with nothing registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `count` fresh elements matched by `query` in `scope`
    pub async fn register(&self, query: Query, scope: SearchScope, count: usize) -> Vec<ElementHandle> {
        let handles: Vec<ElementHandle> = (0..count)
            .map(|_| ElementHandle::new(Uuid::new_v4().to_string()))
            .collect();

        self.elements
            .write()
            .await
            .entry((query, scope))
            .or_default()
            .extend(handles.iter().cloned());

        handles
    }

    /// Register a single element matched by `query` in `scope`
    pub async fn register_one(&self, query: Query, scope: SearchScope) -> ElementHandle {
        let mut handles = self.register(query, scope, 1).await;
        handles.remove(0)
    }

    /// Set the structural path reported for `handle`
    pub async fn set_path(&self, handle: &ElementHandle, path: Query) {
        self.paths.write().await.insert(handle.clone(), path);
    }

    /// All calls received so far
    pub async fn calls(&self) -> Vec<DriverCall> {
        self.calls.read().await.clone()
    }

    /// Lookup calls (`find` and `find_all`) received so far
    pub async fn lookups(&self) -> Vec<DriverCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| call.query().is_some())
            .cloned()
            .collect()
    }

    /// Number of calls received so far
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Forget recorded calls
    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn matches(&self, query: &Query, scope: &SearchScope) -> Vec<ElementHandle> {
        self.elements
            .read()
            .await
            .get(&(query.clone(), scope.clone()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn find(&self, query: &Query, scope: &SearchScope) -> Result<ElementHandle, Error> {
        self.calls.write().await.push(DriverCall::Find {
            query: query.clone(),
            scope: scope.clone(),
        });

        self.matches(query, scope)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(query.to_string(), scope.to_string()))
    }

    async fn find_all(&self, query: &Query, scope: &SearchScope) -> Result<Vec<ElementHandle>, Error> {
        self.calls.write().await.push(DriverCall::FindAll {
            query: query.clone(),
            scope: scope.clone(),
        });

        Ok(self.matches(query, scope).await)
    }

    async fn compute_path(&self, handle: &ElementHandle) -> Result<Query, Error> {
        self.calls.write().await.push(DriverCall::ComputePath {
            handle: handle.clone(),
        });

        self.paths
            .read()
            .await
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::driver(format!("No structural path for element {}", handle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_find_registered() {
        let driver = MockDriver::new();
        let query = Query::xpath("//div[@id='panel']");
        let handle = driver.register_one(query.clone(), SearchScope::Document).await;

        let found = driver.find(&query, &SearchScope::Document).await.unwrap();
        assert_eq!(found, handle);

        // Same query under a different scope does not match
        let other = SearchScope::Element(handle.clone());
        let err = driver.find(&query, &other).await.unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(driver.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_mock_find_all_empty() {
        let driver = MockDriver::new();
        let found = driver
            .find_all(&Query::css("li"), &SearchScope::Document)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_mock_find_returns_first_match() {
        let driver = MockDriver::new();
        let query = Query::xpath("//tr");
        let handles = driver.register(query.clone(), SearchScope::Document, 3).await;

        let first = driver.find(&query, &SearchScope::Document).await.unwrap();
        assert_eq!(first, handles[0]);

        let all = driver.find_all(&query, &SearchScope::Document).await.unwrap();
        assert_eq!(all, handles);
    }

    #[tokio::test]
    async fn test_mock_compute_path() {
        let driver = MockDriver::new();
        let handle = ElementHandle::new("el-1");

        assert!(driver.compute_path(&handle).await.is_err());

        driver.set_path(&handle, Query::xpath("/html/body/div[2]")).await;
        let path = driver.compute_path(&handle).await.unwrap();
        assert_eq!(path.value(), "/html/body/div[2]");

        let calls = driver.calls().await;
        assert_eq!(calls.len(), 2);
        assert!(driver.lookups().await.is_empty());

        driver.clear_calls().await;
        assert_eq!(driver.call_count().await, 0);
    }
}
