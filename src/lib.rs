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

//! Minimum kubelet version enforcement for a Kubernetes-style API server.
//!
//! Three enforcement points share a version comparator and a process-wide
//! policy:
//!
//! - [`plugins::confignode`] validates the cluster Node configuration
//!   object: the `minimumKubeletVersion` threshold is checked against every
//!   registered node, and extreme `workerLatencyProfile` transitions are
//!   rejected.
//! - [`authorization::minimumkubeletversion`] denies API requests from
//!   nodes whose reported kubelet version is below the configured policy
//!   minimum, abstaining on every ambiguous or transient-failure branch.
//! - [`plugins::nodeversion`] is a statically configured admission gate
//!   rejecting node self-registration below a per-process version floor.

pub mod admission;
pub mod api;
pub mod auth;
pub mod authorization;
pub mod client;
pub mod plugins;
pub mod policy;
pub mod version;

// Re-export commonly used types
pub use admission::{
    AdmissionError, AdmissionResult, Attributes, Handler, Interface, Operation,
    ValidationInterface,
};
pub use api::core::{ConfigNode, Node, WorkerLatencyProfile};
pub use authorization::{Authorizer, Decision};
pub use policy::MinimumKubeletVersionPolicy;
