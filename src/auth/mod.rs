// Copyright 2024 The Kubernetes Authors.
// Licensed under the Apache License, Version 2.0

//! Request identity types and node identity resolution.

pub mod nodeidentifier;
pub mod user;

pub use nodeidentifier::{DefaultNodeIdentifier, NodeIdentifier, NODES_GROUP, NODE_USER_PREFIX};
pub use user::UserInfo;
