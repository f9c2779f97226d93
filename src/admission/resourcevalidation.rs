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

//! Validation-only admission over configuration resources.
//!
//! A [`ResourceValidator`] routes requests for a fixed set of resources to
//! per-kind [`ObjectValidator`]s through a lookup table built once at
//! construction. The main resource routes to create/update validation, the
//! `status` subresource to status-update validation, and everything else
//! passes through.

use std::collections::{HashMap, HashSet};

use super::attributes::{Attributes, GroupResource, GroupVersionKind};
use super::errors::{AdmissionError, AdmissionResult, ErrorList, FieldError};
use super::handler::Handler;
use super::interfaces::{Interface, Operation, ValidationInterface};
use crate::api::core::{ApiObject, ObjectMeta};

/// ObjectValidator validates one kind of configuration object.
///
/// Implementations downcast the supplied objects; a wrong concrete type is
/// reported as a field error rather than a panic.
pub trait ObjectValidator: Send + Sync {
    fn validate_create(&self, obj: &dyn ApiObject) -> ErrorList;

    fn validate_update(&self, obj: &dyn ApiObject, old_obj: &dyn ApiObject) -> ErrorList;

    /// Status updates are a distinct, more permissive channel: they must
    /// never fail on spec-level validation errors.
    fn validate_status_update(&self, obj: &dyn ApiObject, old_obj: &dyn ApiObject) -> ErrorList;
}

/// ResourceValidator dispatches admission requests to object validators.
pub struct ResourceValidator {
    handler: Handler,
    resources: HashSet<GroupResource>,
    validators: HashMap<GroupVersionKind, Box<dyn ObjectValidator>>,
}

impl ResourceValidator {
    pub fn new(
        resources: HashSet<GroupResource>,
        validators: HashMap<GroupVersionKind, Box<dyn ObjectValidator>>,
    ) -> Self {
        Self {
            handler: Handler::new_create_update(),
            resources,
            validators,
        }
    }

    fn run_validator(
        &self,
        validator: &dyn ObjectValidator,
        attributes: &dyn Attributes,
    ) -> ErrorList {
        let Some(obj) = attributes.get_object() else {
            return vec![FieldError::required("object")];
        };

        match (attributes.get_operation(), attributes.get_subresource()) {
            (Operation::Create, "") => validator.validate_create(obj),
            (Operation::Update, sub) => {
                let Some(old_obj) = attributes.get_old_object() else {
                    return vec![FieldError::required("oldObject")];
                };
                match sub {
                    "" => validator.validate_update(obj, old_obj),
                    "status" => validator.validate_status_update(obj, old_obj),
                    _ => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }
}

impl Interface for ResourceValidator {
    fn handles(&self, operation: Operation) -> bool {
        self.handler.handles(operation)
    }
}

impl ValidationInterface for ResourceValidator {
    fn validate(&self, attributes: &dyn Attributes) -> AdmissionResult<()> {
        if !self
            .resources
            .contains(&attributes.get_resource().group_resource())
        {
            return Ok(());
        }

        let Some(validator) = self.validators.get(attributes.get_kind()) else {
            return Ok(());
        };

        let errors = self.run_validator(validator.as_ref(), attributes);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AdmissionError::invalid(
                attributes.get_kind().kind.clone(),
                attributes.get_name(),
                errors,
            ))
        }
    }
}

// ============================================================================
// Standard object metadata rules
// ============================================================================

/// Validate object metadata on create. Cluster-scoped singletons require the
/// fixed name "cluster".
pub fn validate_object_meta(meta: &ObjectMeta, require_name_cluster: bool) -> ErrorList {
    let mut errors = Vec::new();
    if meta.name.is_empty() {
        errors.push(FieldError::required("metadata.name"));
    } else if require_name_cluster && meta.name != "cluster" {
        errors.push(FieldError::invalid(
            "metadata.name",
            &meta.name,
            "must be cluster",
        ));
    }
    errors
}

/// Validate object metadata on update.
pub fn validate_object_meta_update(meta: &ObjectMeta, old_meta: &ObjectMeta) -> ErrorList {
    let mut errors = Vec::new();
    if meta.name != old_meta.name {
        errors.push(FieldError::invalid(
            "metadata.name",
            &meta.name,
            "field is immutable",
        ));
    }
    errors
}
