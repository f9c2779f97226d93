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

//! Process-wide minimum kubelet version policy state.
//!
//! The policy is constructed during API server startup, populated once from
//! the external configuration before request handling begins, and injected
//! into the authorizer at construction. Request paths only ever read it.

use std::sync::OnceLock;

use semver::Version;

use crate::version;

/// Holder of the configured minimum kubelet version. Unset means the policy
/// is not enforced.
///
/// Writes go through [`set_minimum`](Self::set_minimum) exactly once during
/// startup; concurrent later callers observe the first value. Reads are
/// lock-free.
#[derive(Debug, Default)]
pub struct MinimumKubeletVersionPolicy {
    minimum: OnceLock<Version>,
}

impl MinimumKubeletVersionPolicy {
    pub fn new() -> Self {
        Self {
            minimum: OnceLock::new(),
        }
    }

    /// Set the minimum version from administrator configuration. An empty
    /// string leaves the policy unset.
    ///
    /// # Panics
    ///
    /// Panics on a malformed version string. This runs only on the startup
    /// path with pre-validated configuration; a malformed value here means
    /// the process must not come up.
    pub fn set_minimum(&self, version: &str) {
        if version.is_empty() {
            return;
        }
        let parsed = match version::parse(version) {
            Ok(v) => v,
            Err(err) => panic!("invalid minimumKubeletVersion {:?}: {}", version, err),
        };
        let stored = self.minimum.get_or_init(|| parsed.clone());
        if *stored != parsed {
            log::warn!(
                "minimumKubeletVersion already set to {}, ignoring {}",
                stored,
                parsed
            );
        }
    }

    /// The configured minimum, if any. Safe under concurrent invocation.
    pub fn current_minimum(&self) -> Option<&Version> {
        self.minimum.get()
    }
}
