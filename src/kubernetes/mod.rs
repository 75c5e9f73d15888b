// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for dynamic API access and resource type discovery.

pub mod api;
pub mod crd;

pub use api::dynamic_api;
pub use crd::{resource_served, wait_for_resource};
