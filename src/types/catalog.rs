// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource type catalog loaded from YAML

use crate::error::Result;
use crate::types::resource::ResourceDescriptor;
use serde::{Deserialize, Serialize};

/// A set of known resource types, looked up by `apiVersion` and `kind`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ResourceCatalog {
    #[serde(default)]
    pub resources: Vec<ResourceDescriptor>,
}

impl ResourceCatalog {
    /// Parse a catalog document of the form `resources: [{group, version, kind, plural}]`
    pub fn from_yaml(document: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(document)?)
    }

    pub fn lookup(&self, api_version: &str, kind: &str) -> Option<&ResourceDescriptor> {
        self.resources
            .iter()
            .find(|d| d.kind == kind && d.api_version() == api_version)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
