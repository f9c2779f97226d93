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

//! Admission error types.

use std::fmt;
use thiserror::Error;

/// Result type for admission operations.
pub type AdmissionResult<T> = Result<T, AdmissionError>;

/// AdmissionError represents errors that can occur during admission.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// BadRequest indicates a malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Forbidden indicates the request is not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Invalid indicates the object carries one or more invalid field
    /// values.
    #[error("{0}")]
    Invalid(InvalidError),

    /// InvalidConfig indicates a plugin was constructed from bad
    /// configuration. Fatal for that plugin at startup.
    #[error("invalid plugin configuration: {0}")]
    InvalidConfig(String),

    /// Internal represents an internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AdmissionError {
    /// Create a new BadRequest error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AdmissionError::BadRequest(msg.into())
    }

    /// Create a new Forbidden error with a plain message.
    pub fn forbidden_msg(msg: impl Into<String>) -> Self {
        AdmissionError::Forbidden(msg.into())
    }

    /// Create an Invalid error from field errors.
    pub fn invalid(kind: impl Into<String>, name: impl Into<String>, errors: ErrorList) -> Self {
        AdmissionError::Invalid(InvalidError {
            kind: kind.into(),
            name: name.into(),
            errors,
        })
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        AdmissionError::InvalidConfig(msg.into())
    }

}

/// InvalidError aggregates the field errors that made an object invalid.
#[derive(Debug)]
pub struct InvalidError {
    pub kind: String,
    pub name: String,
    pub errors: ErrorList,
}

impl fmt::Display for InvalidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(
            f,
            "{} \"{}\" is invalid: [{}]",
            self.kind,
            self.name,
            details.join(", ")
        )
    }
}

/// A list of field-scoped errors, in the order they were found.
pub type ErrorList = Vec<FieldError>;

/// FieldError represents a field-level error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub error_type: FieldErrorType,
    pub value: String,
    pub detail: String,
    pub supported_values: Vec<String>,
}

impl FieldError {
    /// A value that is not in the list of supported values.
    pub fn not_supported(field: &str, value: impl fmt::Display, supported: Vec<&str>) -> Self {
        Self {
            field: field.to_string(),
            error_type: FieldErrorType::NotSupported,
            value: value.to_string(),
            detail: String::new(),
            supported_values: supported.into_iter().map(String::from).collect(),
        }
    }

    /// A malformed or policy-violating value.
    pub fn invalid(field: &str, value: impl fmt::Display, detail: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            error_type: FieldErrorType::Invalid,
            value: value.to_string(),
            detail: detail.into(),
            supported_values: Vec::new(),
        }
    }

    /// An action on the field that cannot be performed, for reasons other
    /// than the value itself (e.g. live state could not be consulted).
    pub fn forbidden(field: &str, detail: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            error_type: FieldErrorType::Forbidden,
            value: String::new(),
            detail: detail.into(),
            supported_values: Vec::new(),
        }
    }

    /// A required field that is missing.
    pub fn required(field: &str) -> Self {
        Self {
            field: field.to_string(),
            error_type: FieldErrorType::Required,
            value: String::new(),
            detail: String::new(),
            supported_values: Vec::new(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_type {
            FieldErrorType::NotSupported => {
                write!(
                    f,
                    "{}: Unsupported value: \"{}\": supported values: {}",
                    self.field,
                    self.value,
                    self.supported_values
                        .iter()
                        .map(|s| format!("\"{}\"", s))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            FieldErrorType::Required => {
                write!(f, "{}: Required value", self.field)
            }
            FieldErrorType::Invalid => {
                write!(f, "{}: Invalid value: \"{}\": {}", self.field, self.value, self.detail)
            }
            FieldErrorType::Forbidden => {
                write!(f, "{}: Forbidden: {}", self.field, self.detail)
            }
        }
    }
}

/// FieldErrorType represents the type of field error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorType {
    /// NotSupported indicates the value is not in the list of supported values.
    NotSupported,
    /// Required indicates a required field is missing.
    Required,
    /// Invalid indicates an invalid value.
    Invalid,
    /// Forbidden indicates the action on the field is not permitted.
    Forbidden,
}
