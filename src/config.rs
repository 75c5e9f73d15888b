// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::FIELD_MANAGER;
use crate::types::{ApplyOptions, ResourceCatalog};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the reconcile request document
    pub request_path: PathBuf,
    /// Optional resource catalog used to resolve `apiVersion`/`kind` requests
    pub catalog_path: Option<PathBuf>,
    pub field_manager: String,
    pub force_conflicts: bool,
    /// Wait for the resource type to be served before touching objects
    pub wait_for_resource: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let request_path = lookup("REQUEST_PATH")
            .map(PathBuf::from)
            .context("REQUEST_PATH environment variable not set")?;
        let catalog_path = lookup("CATALOG_PATH").map(PathBuf::from);
        let field_manager = lookup("FIELD_MANAGER").unwrap_or_else(|| FIELD_MANAGER.to_string());
        let force_conflicts = parse_flag(lookup("FORCE_CONFLICTS"), false);
        let wait_for_resource = parse_flag(lookup("WAIT_FOR_RESOURCE"), true);

        Ok(Config {
            request_path,
            catalog_path,
            field_manager,
            force_conflicts,
            wait_for_resource,
        })
    }

    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions::new(&self.field_manager, self.force_conflicts)
    }

    /// Read the catalog file, or an empty catalog when none is configured
    pub fn load_catalog(&self) -> Result<ResourceCatalog> {
        let Some(path) = &self.catalog_path else {
            return Ok(ResourceCatalog::default());
        };
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        ResourceCatalog::from_yaml(&document)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))
    }
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}
