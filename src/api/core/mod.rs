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

//! Core API types read by the version enforcement components (Node and the
//! cluster Node configuration object).

use std::any::Any;
use std::fmt;

/// ApiObject is a trait for API objects that can be used in admission.
pub trait ApiObject: Send + Sync {
    /// Returns the object as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the object as mutable Any for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the kind of this object.
    fn kind(&self) -> &str;
}

/// ObjectMeta is the subset of standard object metadata these validators read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    pub name: String,
    pub resource_version: String,
}

impl ObjectMeta {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            resource_version: String::new(),
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// Node represents one registered worker node. The kubelet version is
/// self-reported by the node's kubelet and may carry a leading "v"; it is
/// untrusted input and never assumed parseable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    /// Kubelet version as reported in the node status
    /// (status.nodeInfo.kubeletVersion).
    pub kubelet_version: String,
}

impl Node {
    pub fn new(name: &str, kubelet_version: &str) -> Self {
        Self {
            name: name.to_string(),
            kubelet_version: kubelet_version.to_string(),
        }
    }
}

impl ApiObject for Node {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> &str {
        "Node"
    }
}

// ============================================================================
// Cluster Node Configuration
// ============================================================================

/// WorkerLatencyProfile is the administrator-selected reaction sensitivity
/// for worker nodes. Unset is modeled as `Option::None` on the spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerLatencyProfile {
    /// Default reaction timings.
    Default,
    /// Medium update frequency, average reaction. The required staging step
    /// between Default/unset and Low.
    Medium,
    /// Low update frequency, slow reaction.
    Low,
}

impl WorkerLatencyProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerLatencyProfile::Default => "Default",
            WorkerLatencyProfile::Medium => "MediumUpdateAverageReaction",
            WorkerLatencyProfile::Low => "LowUpdateSlowReaction",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Default" => Some(WorkerLatencyProfile::Default),
            "MediumUpdateAverageReaction" => Some(WorkerLatencyProfile::Medium),
            "LowUpdateSlowReaction" => Some(WorkerLatencyProfile::Low),
            _ => None,
        }
    }
}

impl fmt::Display for WorkerLatencyProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format an optional profile the way it appears in the API: unset renders
/// as the empty string.
pub fn latency_profile_name(profile: Option<WorkerLatencyProfile>) -> &'static str {
    profile.map(|p| p.as_str()).unwrap_or("")
}

/// ConfigNodeSpec holds the cluster-wide node policy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNodeSpec {
    /// Minimum kubelet version the cluster will accept; empty means the
    /// policy is not enforced.
    pub minimum_kubelet_version: String,
    pub worker_latency_profile: Option<WorkerLatencyProfile>,
}

/// ConfigNode is the cluster-scoped singleton configuration object carrying
/// the minimum kubelet version and the worker latency profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigNode {
    pub metadata: ObjectMeta,
    pub spec: ConfigNodeSpec,
}

impl ConfigNode {
    pub fn new(name: &str) -> Self {
        Self {
            metadata: ObjectMeta::new(name),
            spec: ConfigNodeSpec::default(),
        }
    }

    pub fn with_minimum_kubelet_version(name: &str, version: &str) -> Self {
        Self {
            metadata: ObjectMeta::new(name),
            spec: ConfigNodeSpec {
                minimum_kubelet_version: version.to_string(),
                worker_latency_profile: None,
            },
        }
    }

    pub fn with_latency_profile(name: &str, profile: Option<WorkerLatencyProfile>) -> Self {
        Self {
            metadata: ObjectMeta::new(name),
            spec: ConfigNodeSpec {
                minimum_kubelet_version: String::new(),
                worker_latency_profile: profile,
            },
        }
    }
}

impl ApiObject for ConfigNode {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> &str {
        "Node"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_profile_round_trip() {
        for profile in [
            WorkerLatencyProfile::Default,
            WorkerLatencyProfile::Medium,
            WorkerLatencyProfile::Low,
        ] {
            assert_eq!(WorkerLatencyProfile::from_str(profile.as_str()), Some(profile));
        }
        assert_eq!(WorkerLatencyProfile::from_str("Fast"), None);
    }

    #[test]
    fn test_latency_profile_name_unset() {
        assert_eq!(latency_profile_name(None), "");
        assert_eq!(
            latency_profile_name(Some(WorkerLatencyProfile::Medium)),
            "MediumUpdateAverageReaction"
        );
    }

    #[test]
    fn test_node_is_api_object() {
        let node = Node::new("node-1", "v1.30.0");
        assert_eq!(ApiObject::kind(&node), "Node");
        assert!(node.as_any().downcast_ref::<Node>().is_some());
    }
}
