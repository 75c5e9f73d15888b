// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconcile requests: a YAML document describing one operation on one object

use crate::error::{ReconcileError, Result};
use crate::reconciler::Reconciler;
use crate::types::{
    ApplyOptions, DeleteWait, DesiredState, PropagationPolicy, ResourceCatalog,
    ResourceDescriptor, ResourceRef, WaitCondition,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Server-side apply, then wait for `waitFor`
    #[default]
    Apply,
    /// Fetch the live object
    Read,
    /// Delete, then wait for `deleteWait`
    Delete,
    /// Print the manifest without contacting the cluster
    Render,
}

impl Action {
    /// Whether the resource type must be served before running this action.
    ///
    /// Read and delete treat an unknown type like an absent object, and render never
    /// contacts the cluster, so only apply has to wait for the type.
    pub fn needs_served_resource(&self) -> bool {
        matches!(self, Action::Apply)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// Full resource type; when absent, `apiVersion` and `kind` are looked up in the catalog
    #[serde(default)]
    pub resource: Option<ResourceDescriptor>,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub action: Action,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub spec: Value,
    #[serde(default)]
    pub wait_for: Vec<WaitCondition>,
    #[serde(default)]
    pub delete_wait: Option<DeleteWait>,
    #[serde(default)]
    pub propagation: Option<PropagationPolicy>,
    /// Overrides the configured field manager
    #[serde(default)]
    pub field_manager: Option<String>,
    /// Overrides the configured conflict handling
    #[serde(default)]
    pub force_conflicts: Option<bool>,
}

impl ReconcileRequest {
    pub fn from_yaml(document: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(document)?)
    }

    pub fn descriptor(&self, catalog: &ResourceCatalog) -> Result<ResourceDescriptor> {
        if let Some(descriptor) = &self.resource {
            return Ok(descriptor.clone());
        }

        let (Some(api_version), Some(kind)) = (&self.api_version, &self.kind) else {
            return Err(ReconcileError::InvalidReference(
                "request needs either 'resource' or both 'apiVersion' and 'kind'".to_string(),
            ));
        };

        catalog.lookup(api_version, kind).cloned().ok_or_else(|| {
            ReconcileError::InvalidReference(format!(
                "resource type {} {} is not in the catalog",
                api_version, kind
            ))
        })
    }

    pub fn resource_ref(&self, catalog: &ResourceCatalog) -> Result<ResourceRef> {
        ResourceRef::new(self.descriptor(catalog)?, &self.namespace, &self.name)
    }

    pub fn desired_state(&self) -> DesiredState {
        DesiredState {
            labels: self.labels.clone(),
            annotations: self.annotations.clone(),
            spec: self.spec.clone(),
        }
    }

    pub fn apply_options(&self, defaults: &ApplyOptions) -> ApplyOptions {
        ApplyOptions {
            field_manager: self
                .field_manager
                .clone()
                .unwrap_or_else(|| defaults.field_manager.clone()),
            force_conflicts: self.force_conflicts.unwrap_or(defaults.force_conflicts),
        }
    }
}

/// Run a request and return the document to print, if the action produces one.
///
/// Reading an object that does not exist yields `None`.
#[instrument(skip_all, fields(action = ?request.action, name = %request.name))]
pub async fn run_request(
    reconciler: &Reconciler,
    request: &ReconcileRequest,
    catalog: &ResourceCatalog,
    defaults: &ApplyOptions,
    cancel: &CancellationToken,
) -> Result<Option<String>> {
    let resource = request.resource_ref(catalog)?;

    match request.action {
        Action::Apply => {
            let observed = reconciler
                .upsert(
                    &resource,
                    &request.desired_state(),
                    &request.apply_options(defaults),
                    Some(request.wait_for.as_slice()),
                    cancel,
                )
                .await?;
            Ok(Some(observed.to_yaml()?))
        }
        Action::Read => match reconciler.read(&resource).await? {
            Some(observed) => Ok(Some(observed.to_yaml()?)),
            None => {
                info!("{} does not exist", resource);
                Ok(None)
            }
        },
        Action::Delete => {
            reconciler
                .remove(
                    &resource,
                    request.propagation,
                    request.delete_wait.as_ref(),
                    cancel,
                )
                .await?;
            Ok(None)
        }
        Action::Render => Ok(Some(reconciler.render(&resource, &request.desired_state())?)),
    }
}
