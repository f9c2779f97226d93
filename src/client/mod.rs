// Copyright 2024 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Access to live node records.
//!
//! The enforcement components consume node state through [`NodeLister`];
//! the hosting server wires in a cache-backed implementation. Lookup
//! failures here are transient and the callers map them to abstain or
//! forbidden outcomes rather than retrying.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::api::core::Node;

/// Errors from node lookups.
#[derive(Debug, Error)]
pub enum NodeListerError {
    #[error("node \"{0}\" not found")]
    NotFound(String),
    #[error("node lookup unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the current set of registered nodes.
pub trait NodeLister: Send + Sync {
    /// List all currently registered nodes.
    fn list(&self) -> Result<Vec<Node>, NodeListerError>;

    /// Get a single node by name.
    fn get(&self, name: &str) -> Result<Node, NodeListerError>;
}

/// In-memory node store, used in tests in place of the live cache.
#[derive(Default)]
pub struct InMemoryNodeStore {
    nodes: RwLock<HashMap<String, Node>>,
}

impl InMemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, node: Node) {
        self.nodes.write().unwrap().insert(node.name.clone(), node);
    }
}

impl NodeLister for InMemoryNodeStore {
    fn list(&self) -> Result<Vec<Node>, NodeListerError> {
        Ok(self.nodes.read().unwrap().values().cloned().collect())
    }

    fn get(&self, name: &str) -> Result<Node, NodeListerError> {
        self.nodes
            .read()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| NodeListerError::NotFound(name.to_string()))
    }
}

/// Node lister that always fails, for exercising lookup-failure branches in
/// tests.
pub struct UnavailableNodeStore;

impl NodeLister for UnavailableNodeStore {
    fn list(&self) -> Result<Vec<Node>, NodeListerError> {
        Err(NodeListerError::Unavailable("cache not synced".to_string()))
    }

    fn get(&self, _name: &str) -> Result<Node, NodeListerError> {
        Err(NodeListerError::Unavailable("cache not synced".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store_get() {
        let store = InMemoryNodeStore::new();
        store.add(Node::new("node-1", "v1.30.0"));

        let node = store.get("node-1").unwrap();
        assert_eq!(node.kubelet_version, "v1.30.0");
        assert!(matches!(
            store.get("node-2"),
            Err(NodeListerError::NotFound(_))
        ));
    }

    #[test]
    fn test_in_memory_store_list() {
        let store = InMemoryNodeStore::new();
        assert!(store.list().unwrap().is_empty());
        store.add(Node::new("node-1", "v1.30.0"));
        store.add(Node::new("node-2", "v1.31.0"));
        assert_eq!(store.list().unwrap().len(), 2);
    }
}
