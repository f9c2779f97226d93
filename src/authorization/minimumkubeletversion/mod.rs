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

//! Authorizer that denies requests from nodes running a kubelet older than
//! the configured minimum version.
//!
//! Every ambiguous or transient-failure branch abstains (NoOpinion) rather
//! than denying; the only deny is the explicit version-too-old check. This
//! keeps a flaky node cache or an oddly-shaped identity from locking nodes
//! out of the API.

use std::sync::Arc;

use crate::auth::NodeIdentifier;
use crate::authorization::{Attributes, Authorizer, Decision};
use crate::client::NodeLister;
use crate::policy::MinimumKubeletVersionPolicy;
use crate::version;

/// MinimumKubeletVersionAuth denies node requests below the policy minimum.
pub struct MinimumKubeletVersionAuth {
    node_identifier: Arc<dyn NodeIdentifier>,
    node_lister: Arc<dyn NodeLister>,
    policy: Arc<MinimumKubeletVersionPolicy>,
}

impl MinimumKubeletVersionAuth {
    pub fn new(
        node_identifier: Arc<dyn NodeIdentifier>,
        node_lister: Arc<dyn NodeLister>,
        policy: Arc<MinimumKubeletVersionPolicy>,
    ) -> Self {
        Self {
            node_identifier,
            node_lister,
            policy,
        }
    }
}

impl Authorizer for MinimumKubeletVersionAuth {
    fn authorize(&self, attrs: &dyn Attributes) -> (Decision, String) {
        // Common case when the feature is disabled; checked before any
        // identity work.
        let Some(min_version) = self.policy.current_minimum() else {
            return (Decision::NoOpinion, String::new());
        };

        let (node_name, is_node) = self.node_identifier.node_identity(attrs.get_user());
        if !is_node {
            // ignore requests from non-nodes
            return (Decision::NoOpinion, String::new());
        }

        if node_name.is_empty() {
            return (
                Decision::NoOpinion,
                format!("unknown node for user {:?}", attrs.get_user().name),
            );
        }

        // Short-circuit "subjectaccessreviews", and "get" or "update" on the
        // node's own object. Regardless of kubelet version, a node must be
        // able to do these things; otherwise an outdated node could never
        // read or update its own record.
        if attrs.is_resource_request() {
            match attrs.get_resource() {
                "nodes" => {
                    let verb = attrs.get_verb();
                    if (verb == "get" || verb == "update") && attrs.get_name() == node_name {
                        return (Decision::NoOpinion, String::new());
                    }
                }
                "subjectaccessreviews" => {
                    return (Decision::NoOpinion, String::new());
                }
                _ => {}
            }
        }

        let node = match self.node_lister.get(&node_name) {
            Ok(node) => node,
            Err(err) => {
                return (
                    Decision::NoOpinion,
                    format!("failed to get node {}: {}", node_name, err),
                );
            }
        };

        let check = version::check_node_version(&node, min_version);
        if check.is_too_old() {
            log::warn!("denying request from node {}: {}", node_name, check.reason());
            return (Decision::Deny, check.reason().to_string());
        }

        (Decision::NoOpinion, check.reason().to_string())
    }
}
