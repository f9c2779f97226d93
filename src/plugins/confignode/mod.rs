// Copyright 2024 The Kubernetes Authors.
// Licensed under the Apache License, Version 2.0

//! Validation of the cluster Node configuration object.
//!
//! Two spec fields are enforced here: `minimumKubeletVersion`, which must
//! not strand any currently registered node below the floor, and
//! `workerLatencyProfile`, whose extreme transitions (skipping the Medium
//! staging profile) are rejected. Status updates never fail on spec-level
//! violations.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::admission::resourcevalidation::{
    validate_object_meta, validate_object_meta_update, ObjectValidator, ResourceValidator,
};
use crate::admission::{ErrorList, FieldError, GroupResource, GroupVersionKind};
use crate::api::core::{latency_profile_name, ApiObject, ConfigNode, WorkerLatencyProfile};
use crate::client::NodeLister;
use crate::version;
use crate::version::VersionCheck;

pub const PLUGIN_NAME: &str = "config.openshift.io/ValidateConfigNodeV1";

const MINIMUM_KUBELET_VERSION_FIELD: &str = "spec.minimumKubeletVersion";
const WORKER_LATENCY_PROFILE_FIELD: &str = "spec.workerLatencyProfile";

/// Profile transitions that skip the Medium staging step. Fixed table, not
/// derived at runtime.
const REJECTED_PROFILE_TRANSITIONS: &[(
    Option<WorkerLatencyProfile>,
    Option<WorkerLatencyProfile>,
)] = &[
    (None, Some(WorkerLatencyProfile::Low)),
    (Some(WorkerLatencyProfile::Low), None),
    (Some(WorkerLatencyProfile::Default), Some(WorkerLatencyProfile::Low)),
    (Some(WorkerLatencyProfile::Low), Some(WorkerLatencyProfile::Default)),
];

/// Build the admission-side validator for the config.openshift.io `nodes`
/// resource, wired to the live node lister.
pub fn new_validator(nodes: Arc<dyn NodeLister>) -> ResourceValidator {
    let mut resources = HashSet::new();
    resources.insert(GroupResource::new("config.openshift.io", "nodes"));

    let mut validators: HashMap<GroupVersionKind, Box<dyn ObjectValidator>> = HashMap::new();
    validators.insert(
        GroupVersionKind::new("config.openshift.io", "v1", "Node"),
        Box::new(ConfigNodeValidator { nodes }),
    );

    ResourceValidator::new(resources, validators)
}

/// ConfigNodeValidator validates create/update of the cluster Node
/// configuration object.
pub struct ConfigNodeValidator {
    nodes: Arc<dyn NodeLister>,
}

impl ConfigNodeValidator {
    pub fn new(nodes: Arc<dyn NodeLister>) -> Self {
        Self { nodes }
    }

    /// Check that no currently registered node falls below the configured
    /// minimum. An empty threshold trivially succeeds.
    fn validate_minimum_kubelet_version(&self, obj: &ConfigNode) -> Option<FieldError> {
        let submitted = &obj.spec.minimum_kubelet_version;
        if submitted.is_empty() {
            return None;
        }

        let nodes = match self.nodes.list() {
            Ok(nodes) => nodes,
            Err(err) => {
                // Inability to consult live state is not a value error.
                return Some(FieldError::forbidden(
                    MINIMUM_KUBELET_VERSION_FIELD,
                    format!("Getting nodes to compare minimum version {}", err),
                ));
            }
        };

        let min_version = match version::parse(submitted) {
            Ok(v) => v,
            Err(err) => {
                return Some(FieldError::invalid(
                    MINIMUM_KUBELET_VERSION_FIELD,
                    submitted,
                    format!("Failed to parse submitted version {} {}", submitted, err),
                ));
            }
        };

        for node in &nodes {
            match version::check_node_version(node, &min_version) {
                VersionCheck::Ok => {}
                check => {
                    return Some(FieldError::invalid(
                        MINIMUM_KUBELET_VERSION_FIELD,
                        submitted,
                        check.reason(),
                    ));
                }
            }
        }
        None
    }
}

/// Reject the worker latency profile transitions that skip the Medium
/// staging profile.
fn validate_latency_profile_transition(obj: &ConfigNode, old_obj: &ConfigNode) -> Option<FieldError> {
    let from_profile = old_obj.spec.worker_latency_profile;
    let to_profile = obj.spec.worker_latency_profile;

    for (from, to) in REJECTED_PROFILE_TRANSITIONS {
        if from_profile == *from && to_profile == *to {
            return Some(FieldError::invalid(
                WORKER_LATENCY_PROFILE_FIELD,
                latency_profile_name(to_profile),
                format!(
                    "cannot update worker latency profile from {:?} to {:?} as extreme profile transition is unsupported, please select any other profile with supported transition such as {:?}",
                    latency_profile_name(from_profile),
                    latency_profile_name(to_profile),
                    WorkerLatencyProfile::Medium.as_str(),
                ),
            ));
        }
    }
    None
}

/// Downcast an admission object to a ConfigNode, reporting the wrong kind as
/// field errors. Should not occur given correct dispatch.
fn to_config_node(obj: &dyn ApiObject) -> Result<&ConfigNode, ErrorList> {
    obj.as_any().downcast_ref::<ConfigNode>().ok_or_else(|| {
        vec![
            FieldError::not_supported("kind", obj.kind(), vec!["Node"]),
            FieldError::not_supported("apiVersion", obj.kind(), vec!["config.openshift.io/v1"]),
        ]
    })
}

impl ObjectValidator for ConfigNodeValidator {
    fn validate_create(&self, obj: &dyn ApiObject) -> ErrorList {
        let obj = match to_config_node(obj) {
            Ok(obj) => obj,
            Err(errors) => return errors,
        };

        let mut errors = validate_object_meta(&obj.metadata, true);
        if let Some(err) = self.validate_minimum_kubelet_version(obj) {
            errors.push(err);
        }
        errors
    }

    fn validate_update(&self, obj: &dyn ApiObject, old_obj: &dyn ApiObject) -> ErrorList {
        let obj = match to_config_node(obj) {
            Ok(obj) => obj,
            Err(errors) => return errors,
        };
        let old_obj = match to_config_node(old_obj) {
            Ok(obj) => obj,
            Err(errors) => return errors,
        };

        let mut errors = validate_object_meta_update(&obj.metadata, &old_obj.metadata);
        if let Some(err) = validate_latency_profile_transition(obj, old_obj) {
            errors.push(err);
        }
        if let Some(err) = self.validate_minimum_kubelet_version(obj) {
            errors.push(err);
        }
        errors
    }

    fn validate_status_update(&self, obj: &dyn ApiObject, old_obj: &dyn ApiObject) -> ErrorList {
        let obj = match to_config_node(obj) {
            Ok(obj) => obj,
            Err(errors) => return errors,
        };
        let old_obj = match to_config_node(old_obj) {
            Ok(obj) => obj,
            Err(errors) => return errors,
        };

        // Status validation must never fail on spec validation errors.
        validate_object_meta_update(&obj.metadata, &old_obj.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::FieldErrorType;
    use crate::api::core::Node;
    use crate::client::{InMemoryNodeStore, UnavailableNodeStore};

    fn validator_with_nodes(nodes: &[Node]) -> ConfigNodeValidator {
        let store = InMemoryNodeStore::new();
        for node in nodes {
            store.add(node.clone());
        }
        ConfigNodeValidator::new(Arc::new(store))
    }

    fn config(version: &str) -> ConfigNode {
        ConfigNode::with_minimum_kubelet_version("cluster", version)
    }

    #[test]
    fn test_empty_threshold_always_succeeds() {
        // Even a dead node lister cannot fail an unset policy.
        let validator = ConfigNodeValidator::new(Arc::new(UnavailableNodeStore));
        assert!(validator.validate_minimum_kubelet_version(&config("")).is_none());
        assert!(validator.validate_create(&config("")).is_empty());
    }

    #[test]
    fn test_no_nodes_succeeds() {
        let validator = validator_with_nodes(&[]);
        assert!(validator.validate_minimum_kubelet_version(&config("1.30.0")).is_none());
    }

    #[test]
    fn test_all_nodes_at_or_above_minimum() {
        let validator = validator_with_nodes(&[
            Node::new("node-1", "v1.30.0"),
            Node::new("node-2", "1.31.2"),
        ]);
        assert!(validator.validate_minimum_kubelet_version(&config("1.30.0")).is_none());
    }

    #[test]
    fn test_old_node_rejects_naming_the_node() {
        let validator = validator_with_nodes(&[
            Node::new("node-1", "v1.30.0"),
            Node::new("node-2", "v1.28.3"),
        ]);
        let err = validator
            .validate_minimum_kubelet_version(&config("1.30.0"))
            .unwrap();
        assert_eq!(err.error_type, FieldErrorType::Invalid);
        assert_eq!(err.field, MINIMUM_KUBELET_VERSION_FIELD);
        assert!(err.detail.contains("node-2"));
        assert!(err.detail.contains("1.28.3"));
        assert!(err.detail.contains("1.30.0"));
    }

    #[test]
    fn test_unparseable_node_version_rejects() {
        let validator = validator_with_nodes(&[Node::new("node-1", "garbage")]);
        let err = validator
            .validate_minimum_kubelet_version(&config("1.30.0"))
            .unwrap();
        assert_eq!(err.error_type, FieldErrorType::Invalid);
        assert!(err.detail.contains("failed to parse"));
    }

    #[test]
    fn test_malformed_threshold_is_invalid() {
        let validator = validator_with_nodes(&[Node::new("node-1", "v1.30.0")]);
        let err = validator
            .validate_minimum_kubelet_version(&config("not-a-version"))
            .unwrap();
        assert_eq!(err.error_type, FieldErrorType::Invalid);
        assert!(err.detail.contains("Failed to parse submitted version"));
    }

    #[test]
    fn test_node_list_failure_is_forbidden() {
        let validator = ConfigNodeValidator::new(Arc::new(UnavailableNodeStore));
        let err = validator
            .validate_minimum_kubelet_version(&config("1.30.0"))
            .unwrap();
        assert_eq!(err.error_type, FieldErrorType::Forbidden);
        assert!(err.detail.contains("Getting nodes"));
    }

    #[test]
    fn test_create_requires_cluster_name() {
        let validator = validator_with_nodes(&[]);
        let errors = validator.validate_create(&ConfigNode::new("not-cluster"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "metadata.name");
    }

    #[test]
    fn test_latency_profile_rejected_transitions() {
        let rejected = [
            (None, Some(WorkerLatencyProfile::Low)),
            (Some(WorkerLatencyProfile::Low), None),
            (Some(WorkerLatencyProfile::Default), Some(WorkerLatencyProfile::Low)),
            (Some(WorkerLatencyProfile::Low), Some(WorkerLatencyProfile::Default)),
        ];
        for (from, to) in rejected {
            let old_obj = ConfigNode::with_latency_profile("cluster", from);
            let obj = ConfigNode::with_latency_profile("cluster", to);
            let err = validate_latency_profile_transition(&obj, &old_obj)
                .unwrap_or_else(|| panic!("expected rejection for {:?} -> {:?}", from, to));
            assert_eq!(err.field, WORKER_LATENCY_PROFILE_FIELD);
            assert!(err.detail.contains("MediumUpdateAverageReaction"));
        }
    }

    #[test]
    fn test_latency_profile_allowed_transitions() {
        let allowed = [
            (None, Some(WorkerLatencyProfile::Medium)),
            (None, Some(WorkerLatencyProfile::Default)),
            (Some(WorkerLatencyProfile::Default), None),
            (Some(WorkerLatencyProfile::Medium), Some(WorkerLatencyProfile::Low)),
            (Some(WorkerLatencyProfile::Low), Some(WorkerLatencyProfile::Medium)),
            (Some(WorkerLatencyProfile::Medium), None),
            (Some(WorkerLatencyProfile::Low), Some(WorkerLatencyProfile::Low)),
        ];
        for (from, to) in allowed {
            let old_obj = ConfigNode::with_latency_profile("cluster", from);
            let obj = ConfigNode::with_latency_profile("cluster", to);
            assert!(
                validate_latency_profile_transition(&obj, &old_obj).is_none(),
                "expected {:?} -> {:?} to be allowed",
                from,
                to
            );
        }
    }

    #[test]
    fn test_update_runs_profile_and_version_checks() {
        let validator = validator_with_nodes(&[Node::new("node-1", "v1.28.0")]);

        let mut old_obj = ConfigNode::new("cluster");
        old_obj.spec.worker_latency_profile = None;
        let mut obj = config("1.30.0");
        obj.spec.worker_latency_profile = Some(WorkerLatencyProfile::Low);

        let errors = validator.validate_update(&obj, &old_obj);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, WORKER_LATENCY_PROFILE_FIELD);
        assert_eq!(errors[1].field, MINIMUM_KUBELET_VERSION_FIELD);
    }

    #[test]
    fn test_status_update_ignores_spec_violations() {
        // Spec would fail both checks; status channel does not care.
        let validator = validator_with_nodes(&[Node::new("node-1", "v1.28.0")]);

        let old_obj = ConfigNode::with_latency_profile("cluster", None);
        let mut obj = config("1.30.0");
        obj.spec.worker_latency_profile = Some(WorkerLatencyProfile::Low);

        assert!(validator.validate_status_update(&obj, &old_obj).is_empty());
    }

    #[test]
    fn test_wrong_kind_is_not_supported() {
        let validator = validator_with_nodes(&[]);
        let node = Node::new("node-1", "v1.30.0");
        let errors = validator.validate_create(&node);
        assert!(errors
            .iter()
            .any(|e| e.error_type == FieldErrorType::NotSupported));
    }

    #[test]
    fn test_new_validator_wires_dispatch() {
        use crate::admission::{AttributesRecord, Operation, ValidationInterface};

        let store = InMemoryNodeStore::new();
        store.add(Node::new("node-1", "v1.28.0"));
        let validator = new_validator(Arc::new(store));

        let attrs = AttributesRecord::new_config_node(
            "cluster",
            Operation::Create,
            Some(Box::new(config("1.30.0"))),
            None,
            "",
        );
        let err = validator.validate(&attrs).unwrap_err();
        assert!(err.to_string().contains("minimumKubeletVersion"));
    }
}
