// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Dynamic API handles for descriptor-defined resource types

use crate::types::ResourceRef;
use kube::api::{Api, DynamicObject};
use kube::Client;

/// Build a namespaced dynamic API for the resource type and namespace of `resource`
pub fn dynamic_api(client: &Client, resource: &ResourceRef) -> Api<DynamicObject> {
    let ar = resource.descriptor().api_resource();
    Api::namespaced_with(client.clone(), resource.namespace(), &ar)
}
