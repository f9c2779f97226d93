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

//! Request authorization interfaces.
//!
//! An [`Authorizer`] sees every inbound request before admission and returns
//! a [`Decision`] plus a human-readable reason. `NoOpinion` defers to the
//! rest of the authorizer chain.

use crate::auth::UserInfo;

pub mod minimumkubeletversion;

/// Decision is the outcome of one authorizer in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Allow the request outright.
    Allow,
    /// Deny the request, short-circuiting the chain.
    Deny,
    /// No opinion; defer to the next authorizer.
    NoOpinion,
}

/// Attributes describe an inbound request from the authorizer's point of
/// view.
pub trait Attributes {
    /// The authenticated user making the request.
    fn get_user(&self) -> &UserInfo;

    /// The request verb (get, list, create, update, ...).
    fn get_verb(&self) -> &str;

    /// Whether this request addresses an API resource (as opposed to a
    /// non-resource path such as /healthz).
    fn is_resource_request(&self) -> bool;

    /// The API group of the resource, empty for the core group.
    fn get_api_group(&self) -> &str;

    /// The resource being requested.
    fn get_resource(&self) -> &str;

    /// The name of the object, empty for list-style requests.
    fn get_name(&self) -> &str;
}

/// Authorizer makes an authorization decision for a request.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, attributes: &dyn Attributes) -> (Decision, String);
}

/// AttributesRecord is a concrete implementation of [`Attributes`].
#[derive(Debug, Clone, Default)]
pub struct AttributesRecord {
    pub user: UserInfo,
    pub verb: String,
    pub resource_request: bool,
    pub api_group: String,
    pub resource: String,
    pub name: String,
}

impl AttributesRecord {
    /// Attributes for a resource request in the given group.
    pub fn resource(user: UserInfo, verb: &str, api_group: &str, resource: &str, name: &str) -> Self {
        Self {
            user,
            verb: verb.to_string(),
            resource_request: true,
            api_group: api_group.to_string(),
            resource: resource.to_string(),
            name: name.to_string(),
        }
    }

    /// Attributes for a non-resource request.
    pub fn non_resource(user: UserInfo, verb: &str) -> Self {
        Self {
            user,
            verb: verb.to_string(),
            resource_request: false,
            api_group: String::new(),
            resource: String::new(),
            name: String::new(),
        }
    }
}

impl Attributes for AttributesRecord {
    fn get_user(&self) -> &UserInfo {
        &self.user
    }
    fn get_verb(&self) -> &str {
        &self.verb
    }
    fn is_resource_request(&self) -> bool {
        self.resource_request
    }
    fn get_api_group(&self) -> &str {
        &self.api_group
    }
    fn get_resource(&self) -> &str {
        &self.resource
    }
    fn get_name(&self) -> &str {
        &self.name
    }
}
