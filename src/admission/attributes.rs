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

//! Admission attributes that describe an admission request.

use super::interfaces::Operation;
use crate::api::core::ApiObject;
use crate::auth::UserInfo;

/// GroupVersionResource identifies a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }

    /// Returns just the group and resource portion.
    pub fn group_resource(&self) -> GroupResource {
        GroupResource {
            group: self.group.clone(),
            resource: self.resource.clone(),
        }
    }
}

/// GroupResource identifies a resource without version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupResource {
    pub group: String,
    pub resource: String,
}

impl GroupResource {
    pub fn new(group: &str, resource: &str) -> Self {
        Self {
            group: group.to_string(),
            resource: resource.to_string(),
        }
    }
}

/// GroupVersionKind identifies a kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// Attributes is an interface used by admission controllers to get
/// information about a request that is used to make an admission decision.
pub trait Attributes {
    /// Returns the name of the object as presented in the request.
    fn get_name(&self) -> &str;

    /// Returns the resource being requested.
    fn get_resource(&self) -> &GroupVersionResource;

    /// Returns the name of the subresource being requested.
    fn get_subresource(&self) -> &str;

    /// Returns the operation being performed.
    fn get_operation(&self) -> Operation;

    /// Returns the object from the incoming request.
    fn get_object(&self) -> Option<&dyn ApiObject>;

    /// Returns the existing object (only populated for UPDATE and DELETE
    /// requests).
    fn get_old_object(&self) -> Option<&dyn ApiObject>;

    /// Returns the kind of object being manipulated.
    fn get_kind(&self) -> &GroupVersionKind;

    /// Returns the authenticated user making the request.
    fn get_user_info(&self) -> &UserInfo;
}

/// AttributesRecord is a concrete implementation of Attributes.
pub struct AttributesRecord {
    pub name: String,
    pub resource: GroupVersionResource,
    pub subresource: String,
    pub operation: Operation,
    pub object: Option<Box<dyn ApiObject>>,
    pub old_object: Option<Box<dyn ApiObject>>,
    pub kind: GroupVersionKind,
    pub user: UserInfo,
}

impl AttributesRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: &str,
        resource: GroupVersionResource,
        subresource: &str,
        operation: Operation,
        object: Option<Box<dyn ApiObject>>,
        old_object: Option<Box<dyn ApiObject>>,
        kind: GroupVersionKind,
        user: UserInfo,
    ) -> Self {
        Self {
            name: name.to_string(),
            resource,
            subresource: subresource.to_string(),
            operation,
            object,
            old_object,
            kind,
            user,
        }
    }

    /// Helper to create attributes for a core-group Node resource request.
    pub fn new_node(
        name: &str,
        operation: Operation,
        object: Option<Box<dyn ApiObject>>,
        old_object: Option<Box<dyn ApiObject>>,
        user: UserInfo,
    ) -> Self {
        Self::new(
            name,
            GroupVersionResource::new("", "v1", "nodes"),
            "",
            operation,
            object,
            old_object,
            GroupVersionKind::new("", "v1", "Node"),
            user,
        )
    }

    /// Helper to create attributes for the cluster Node configuration
    /// object (config.openshift.io group).
    pub fn new_config_node(
        name: &str,
        operation: Operation,
        object: Option<Box<dyn ApiObject>>,
        old_object: Option<Box<dyn ApiObject>>,
        subresource: &str,
    ) -> Self {
        Self::new(
            name,
            GroupVersionResource::new("config.openshift.io", "v1", "nodes"),
            subresource,
            operation,
            object,
            old_object,
            GroupVersionKind::new("config.openshift.io", "v1", "Node"),
            UserInfo::default(),
        )
    }
}

impl Attributes for AttributesRecord {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_resource(&self) -> &GroupVersionResource {
        &self.resource
    }

    fn get_subresource(&self) -> &str {
        &self.subresource
    }

    fn get_operation(&self) -> Operation {
        self.operation
    }

    fn get_object(&self) -> Option<&dyn ApiObject> {
        self.object.as_ref().map(|o| o.as_ref())
    }

    fn get_old_object(&self) -> Option<&dyn ApiObject> {
        self.old_object.as_ref().map(|o| o.as_ref())
    }

    fn get_kind(&self) -> &GroupVersionKind {
        &self.kind
    }

    fn get_user_info(&self) -> &UserInfo {
        &self.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::core::Node;

    #[test]
    fn test_attributes_record_node() {
        let node = Node::new("node-1", "v1.30.0");
        let attrs = AttributesRecord::new_node(
            "node-1",
            Operation::Create,
            Some(Box::new(node)),
            None,
            UserInfo::new("system:node:node-1"),
        );

        assert_eq!(attrs.get_name(), "node-1");
        assert_eq!(attrs.get_operation(), Operation::Create);
        assert_eq!(attrs.get_resource().resource, "nodes");
        assert_eq!(attrs.get_user_info().name, "system:node:node-1");
        assert!(attrs
            .get_object()
            .and_then(|o| o.as_any().downcast_ref::<Node>())
            .is_some());
    }

    #[test]
    fn test_group_version_resource() {
        let gvr = GroupVersionResource::new("config.openshift.io", "v1", "nodes");
        assert_eq!(gvr.group, "config.openshift.io");
        assert_eq!(gvr.version, "v1");
        assert_eq!(gvr.resource, "nodes");

        let gr = gvr.group_resource();
        assert_eq!(gr.group, "config.openshift.io");
        assert_eq!(gr.resource, "nodes");
    }
}
