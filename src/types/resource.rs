// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{ReconcileError, Result};
use kube::core::{ApiResource, GroupVersionKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (group, version, kind, plural) record identifying a resource type.
///
/// One value of this type stands in for everything a per-kind generated
/// implementation would otherwise hard-code.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceDescriptor {
    /// API group, empty for the core group
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Lowercase plural used in the REST path
    pub plural: String,
}

impl ResourceDescriptor {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            plural: plural.into(),
        }
    }

    /// The `apiVersion` written into object envelopes
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// The kube dynamic API resource for this type
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(&self.group, &self.version, &self.kind);
        ApiResource::from_gvk_with_plural(&gvk, &self.plural)
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.plural)
    }
}

/// Identifies one namespaced object instance.
///
/// Namespace and name are validated on construction and cannot be changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRef {
    descriptor: ResourceDescriptor,
    namespace: String,
    name: String,
}

impl ResourceRef {
    pub fn new(
        descriptor: ResourceDescriptor,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let namespace = namespace.into();
        let name = name.into();

        if !is_dns_label(&namespace) {
            return Err(ReconcileError::InvalidReference(format!(
                "namespace '{}' is not a valid RFC 1123 label",
                namespace
            )));
        }
        if !is_dns_subdomain(&name) {
            return Err(ReconcileError::InvalidReference(format!(
                "name '{}' is not a valid RFC 1123 subdomain",
                name
            )));
        }

        Ok(Self {
            descriptor,
            namespace,
            name,
        })
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.descriptor, self.namespace, self.name)
    }
}

/// RFC 1123 label: at most 63 lowercase alphanumerics or '-', alphanumeric at both ends
pub fn is_dns_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };

    bytes.len() <= 63
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
}

/// RFC 1123 subdomain: at most 253 characters of dot-separated labels
pub fn is_dns_subdomain(value: &str) -> bool {
    !value.is_empty() && value.len() <= 253 && value.split('.').all(is_dns_label)
}
