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

//! Semantic version parsing and comparison for kubelet versions.
//!
//! Two comparison modes exist and must stay distinct:
//!
//! - [`is_at_least`] uses exact semver precedence, where a pre-release sorts
//!   below the same version without one. Used by the static NodeVersion
//!   admission gate.
//! - [`check_node_version`] uses release-only comparison: pre-release and
//!   build metadata are stripped from the node's reported version before
//!   comparing, so a pre-release kubelet is not penalized relative to its
//!   release line. Used by the authorizer and the cluster config validator.

use semver::{BuildMetadata, Prerelease, Version};

use crate::api::core::Node;

/// Outcome of checking a node's reported kubelet version against a minimum.
///
/// A reported version that fails to parse is a distinct outcome from "too
/// old": the caller decides whether that is a validation failure (config
/// validator) or a diagnostic-only abstention (authorizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// The node's version meets the minimum.
    Ok,
    /// The node's version is below the minimum.
    TooOld(String),
    /// The node's reported version could not be parsed.
    Unparseable(String),
}

impl VersionCheck {
    pub fn is_too_old(&self) -> bool {
        matches!(self, VersionCheck::TooOld(_))
    }

    /// The diagnostic for a non-Ok outcome, empty for Ok.
    pub fn reason(&self) -> &str {
        match self {
            VersionCheck::Ok => "",
            VersionCheck::TooOld(reason) | VersionCheck::Unparseable(reason) => reason,
        }
    }
}

/// Parse an administrator-supplied version string. No "v" prefix handling:
/// configuration is expected to carry a bare semantic version.
pub fn parse(s: &str) -> Result<Version, semver::Error> {
    Version::parse(s)
}

/// Parse a node-reported version string, tolerating the "v" prefix kubelets
/// commonly report ("v1.30.0").
pub fn parse_reported(s: &str) -> Result<Version, semver::Error> {
    Version::parse(s.strip_prefix('v').unwrap_or(s))
}

/// Exact semver comparison: true if `candidate` is at least `floor`,
/// including pre-release precedence ("1.30.0-rc.1" is not at least
/// "1.30.0").
pub fn is_at_least(candidate: &Version, floor: &Version) -> bool {
    candidate >= floor
}

/// Release-only comparison of a node's reported kubelet version against the
/// configured minimum. Pre-release and build metadata are discarded from the
/// reported version before comparing.
pub fn check_node_version(node: &Node, min_version: &Version) -> VersionCheck {
    let mut version = match parse_reported(&node.kubelet_version) {
        Ok(v) => v,
        Err(err) => {
            return VersionCheck::Unparseable(format!(
                "failed to parse node version {}: {}",
                node.kubelet_version, err
            ))
        }
    };

    version.pre = Prerelease::EMPTY;
    version.build = BuildMetadata::EMPTY;

    if *min_version > version {
        return VersionCheck::TooOld(format!(
            "kubelet version of node {} is {}, which is lower than minimumKubeletVersion of {}",
            node.name, version, min_version
        ));
    }
    VersionCheck::Ok
}
