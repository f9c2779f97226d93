// Copyright 2024 The Kubernetes Authors.
// Licensed under the Apache License, Version 2.0

//! NodeVersion admission controller.
//!
//! A static minimum-version gate over Node object writes by the node
//! itself: the plugin is configured once at startup from a JSON or YAML
//! file and rejects any node create/update whose reported kubelet version
//! is below that floor, or that targets another node's object. It is
//! independent of the cluster-config-driven policy and shares no state
//! with it.
//!
//! Config file format (JSON or YAML):
//!
//! ```yaml
//! versionPolicy:
//!   minimumVersion: "1.18.0"
//! ```

use std::io::Read;
use std::sync::Arc;

use semver::Version;
use serde::Deserialize;

use crate::admission::{
    AdmissionError, AdmissionResult, Attributes, Handler, Interface, Operation, Plugins,
    ValidationInterface,
};
use crate::api::core::Node;
use crate::auth::{DefaultNodeIdentifier, NodeIdentifier};
use crate::version;

pub const PLUGIN_NAME: &str = "NodeVersion";

/// Register the NodeVersion plugin. Construction fails when no
/// configuration is supplied.
pub fn register(plugins: &Plugins) {
    plugins.register(PLUGIN_NAME, |config: Option<&mut dyn Read>| {
        let plugin = Plugin::new(DefaultNodeIdentifier, config)?;
        Ok(Arc::new(plugin) as Arc<dyn Interface>)
    });
}

/// VersionConfig is the on-disk configuration for this plugin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionConfig {
    version_policy: VersionPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionPolicy {
    minimum_version: String,
}

/// NodeVersion admission plugin.
#[derive(Debug)]
pub struct Plugin<I: NodeIdentifier> {
    handler: Handler,
    node_identifier: I,
    min_kubelet_version: Version,
}

impl<I: NodeIdentifier> Plugin<I> {
    /// Create the plugin from its configuration stream. Missing or
    /// malformed configuration is fatal for this plugin.
    pub fn new(node_identifier: I, config: Option<&mut dyn Read>) -> AdmissionResult<Self> {
        let Some(config) = config else {
            return Err(AdmissionError::invalid_config("no config specified"));
        };

        // serde_yaml also accepts JSON input, matching the YAML-or-JSON
        // config file contract.
        let config: VersionConfig = serde_yaml::from_reader(config)
            .map_err(|err| AdmissionError::invalid_config(err.to_string()))?;

        let min_kubelet_version = version::parse(&config.version_policy.minimum_version)
            .map_err(|err| {
                AdmissionError::invalid_config(format!(
                    "invalid minimumVersion {:?}: {}",
                    config.version_policy.minimum_version, err
                ))
            })?;

        log::debug!(
            "{} enforcing minimum kubelet version {}",
            PLUGIN_NAME,
            min_kubelet_version
        );

        Ok(Self {
            handler: Handler::new(&[Operation::Create, Operation::Update, Operation::Delete]),
            node_identifier,
            min_kubelet_version,
        })
    }

    fn validate_node(&self, node_name: &str, attributes: &dyn Attributes) -> AdmissionResult<()> {
        let requested_name = attributes.get_name();
        if requested_name != node_name {
            return Err(AdmissionError::forbidden_msg(format!(
                "node \"{}\" is not allowed to modify node \"{}\"",
                node_name, requested_name
            )));
        }

        // Deletes and status-only updates carry no version to check.
        if !attributes.get_subresource().is_empty() {
            return Ok(());
        }

        match attributes.get_operation() {
            Operation::Create | Operation::Update => {
                let node = attributes
                    .get_object()
                    .and_then(|o| o.as_any().downcast_ref::<Node>())
                    .ok_or_else(|| AdmissionError::bad_request("unexpected type"))?;
                self.validate_version(node)
            }
            _ => Ok(()),
        }
    }

    fn validate_version(&self, node: &Node) -> AdmissionResult<()> {
        let given_version = version::parse_reported(&node.kubelet_version).map_err(|err| {
            AdmissionError::forbidden_msg(format!(
                "unexpected version {}: {}",
                node.kubelet_version, err
            ))
        })?;

        if !version::is_at_least(&given_version, &self.min_kubelet_version) {
            return Err(AdmissionError::forbidden_msg(format!(
                "registered kubelet version {} lower than configured minimum {}",
                given_version, self.min_kubelet_version
            )));
        }
        Ok(())
    }
}

impl<I: NodeIdentifier + 'static> Interface for Plugin<I> {
    fn handles(&self, operation: Operation) -> bool {
        self.handler.handles(operation)
    }
}

impl<I: NodeIdentifier + 'static> ValidationInterface for Plugin<I> {
    fn validate(&self, attributes: &dyn Attributes) -> AdmissionResult<()> {
        let user_info = attributes.get_user_info();
        let (node_name, is_node) = self.node_identifier.node_identity(user_info);

        // Our job is just to restrict nodes.
        if !is_node {
            return Ok(());
        }

        if node_name.is_empty() {
            // disallow requests we cannot match to a particular node
            return Err(AdmissionError::forbidden_msg(format!(
                "could not determine node from user \"{}\"",
                user_info.name
            )));
        }

        let resource = attributes.get_resource();
        match (resource.group.as_str(), resource.resource.as_str()) {
            ("", "nodes") => self.validate_node(&node_name, attributes),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::AttributesRecord;
    use crate::auth::{UserInfo, NODES_GROUP};

    fn node_user(name: &str) -> UserInfo {
        UserInfo::with_groups(
            &format!("system:node:{}", name),
            vec![NODES_GROUP.to_string()],
        )
    }

    fn plugin(minimum: &str) -> Plugin<DefaultNodeIdentifier> {
        let config = format!("versionPolicy:\n  minimumVersion: \"{}\"\n", minimum);
        Plugin::new(DefaultNodeIdentifier, Some(&mut config.as_bytes())).unwrap()
    }

    fn node_attrs(
        target: &str,
        operation: Operation,
        reported_version: &str,
        user: UserInfo,
    ) -> AttributesRecord {
        AttributesRecord::new_node(
            target,
            operation,
            Some(Box::new(Node::new(target, reported_version))),
            None,
            user,
        )
    }

    #[test]
    fn test_missing_config_fails_construction() {
        let err = Plugin::new(DefaultNodeIdentifier, None).unwrap_err();
        assert!(err.to_string().contains("no config specified"));
    }

    #[test]
    fn test_malformed_config_fails_construction() {
        let mut bad = "not: [valid".as_bytes();
        assert!(Plugin::new(DefaultNodeIdentifier, Some(&mut bad)).is_err());
    }

    #[test]
    fn test_unparsable_minimum_fails_construction() {
        let mut config = "versionPolicy:\n  minimumVersion: \"one.two\"\n".as_bytes();
        let err = Plugin::new(DefaultNodeIdentifier, Some(&mut config)).unwrap_err();
        assert!(err.to_string().contains("one.two"));
    }

    #[test]
    fn test_json_config_accepted() {
        let config = serde_json::json!({
            "versionPolicy": {"minimumVersion": "1.18.0"}
        })
        .to_string();
        let plugin = Plugin::new(DefaultNodeIdentifier, Some(&mut config.as_bytes())).unwrap();
        assert_eq!(plugin.min_kubelet_version, Version::new(1, 18, 0));
    }

    #[test]
    fn test_handles() {
        let plugin = plugin("1.18.0");
        assert!(plugin.handles(Operation::Create));
        assert!(plugin.handles(Operation::Update));
        assert!(plugin.handles(Operation::Delete));
        assert!(!plugin.handles(Operation::Connect));
    }

    #[test]
    fn test_registration_requires_config() {
        let plugins = Plugins::new();
        register(&plugins);
        assert!(plugins.is_registered(PLUGIN_NAME));
        assert!(plugins.new_from_plugins(PLUGIN_NAME, None).is_err());

        let mut config = "versionPolicy:\n  minimumVersion: \"1.18.0\"\n".as_bytes();
        assert!(plugins
            .new_from_plugins(PLUGIN_NAME, Some(&mut config))
            .is_ok());
    }

    #[test]
    fn test_create_at_minimum_allowed() {
        let plugin = plugin("1.18.0");
        let attrs = node_attrs("a", Operation::Create, "1.18.0", node_user("a"));
        assert!(plugin.validate(&attrs).is_ok());
    }

    #[test]
    fn test_create_below_minimum_denied() {
        let plugin = plugin("1.18.0");
        let attrs = node_attrs("a", Operation::Create, "1.17.9", node_user("a"));
        let err = plugin.validate(&attrs).unwrap_err();
        assert!(err.to_string().contains("1.17.9"));
        assert!(err.to_string().contains("1.18.0"));
    }

    #[test]
    fn test_prerelease_below_minimum_denied() {
        // The static gate uses exact comparison: a pre-release of the
        // minimum is still below it.
        let plugin = plugin("1.18.0");
        let attrs = node_attrs("a", Operation::Update, "1.18.0-rc.2", node_user("a"));
        assert!(plugin.validate(&attrs).is_err());
    }

    #[test]
    fn test_update_other_node_denied_regardless_of_version() {
        let plugin = plugin("1.18.0");
        let attrs = node_attrs("a", Operation::Update, "1.19.0", node_user("b"));
        let err = plugin.validate(&attrs).unwrap_err();
        assert!(err.to_string().contains("not allowed to modify"));
    }

    #[test]
    fn test_unparseable_reported_version_denied_with_parse_error() {
        let plugin = plugin("1.18.0");
        let attrs = node_attrs("a", Operation::Create, "garbage", node_user("a"));
        let err = plugin.validate(&attrs).unwrap_err();
        assert!(err.to_string().contains("unexpected version garbage"));
    }

    #[test]
    fn test_delete_exempt_from_version_check() {
        let plugin = plugin("1.18.0");
        let attrs = node_attrs("a", Operation::Delete, "1.0.0", node_user("a"));
        assert!(plugin.validate(&attrs).is_ok());
    }

    #[test]
    fn test_status_update_exempt_from_version_check() {
        let plugin = plugin("1.18.0");
        let mut attrs = node_attrs("a", Operation::Update, "1.0.0", node_user("a"));
        attrs.subresource = "status".to_string();
        assert!(plugin.validate(&attrs).is_ok());
    }

    #[test]
    fn test_non_node_user_allowed() {
        let plugin = plugin("1.18.0");
        let attrs = node_attrs("a", Operation::Create, "1.0.0", UserInfo::new("admin"));
        assert!(plugin.validate(&attrs).is_ok());
    }

    #[test]
    fn test_node_without_name_denied() {
        let plugin = plugin("1.18.0");
        let user = UserInfo::with_groups("system:node:", vec![NODES_GROUP.to_string()]);
        let attrs = node_attrs("a", Operation::Create, "1.19.0", user);
        let err = plugin.validate(&attrs).unwrap_err();
        assert!(err.to_string().contains("could not determine node"));
    }

    #[test]
    fn test_other_resources_pass_through() {
        use crate::admission::attributes::{GroupVersionKind, GroupVersionResource};

        let plugin = plugin("1.18.0");
        let attrs = AttributesRecord::new(
            "my-pod",
            GroupVersionResource::new("", "v1", "pods"),
            "",
            Operation::Create,
            None,
            None,
            GroupVersionKind::new("", "v1", "Pod"),
            node_user("a"),
        );
        assert!(plugin.validate(&attrs).is_ok());
    }
}
