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

//! Node identity resolution from request user info.

use super::user::UserInfo;

/// System node username prefix.
pub const NODE_USER_PREFIX: &str = "system:node:";

/// System nodes group.
pub const NODES_GROUP: &str = "system:nodes";

/// NodeIdentifier identifies nodes from user info.
pub trait NodeIdentifier: Send + Sync {
    /// Returns (node_name, is_node) where is_node indicates if the user is a
    /// node. A node identity with an empty name means the caller is a node
    /// but the node name could not be derived.
    fn node_identity(&self, user: &UserInfo) -> (String, bool);
}

/// Default node identifier: members of the `system:nodes` group with a
/// `system:node:` username prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeIdentifier;

impl NodeIdentifier for DefaultNodeIdentifier {
    fn node_identity(&self, user: &UserInfo) -> (String, bool) {
        if !user.groups.iter().any(|g| g == NODES_GROUP) {
            return (String::new(), false);
        }

        match user.name.strip_prefix(NODE_USER_PREFIX) {
            Some(node_name) => (node_name.to_string(), true),
            None => (String::new(), false),
        }
    }
}
