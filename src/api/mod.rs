// Copyright 2024 The Kubernetes Authors.
// Licensed under the Apache License, Version 2.0

//! API types consumed by the enforcement components.

pub mod core;
