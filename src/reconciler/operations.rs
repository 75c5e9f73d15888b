// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Single-shot apply, read and delete against the API server

use crate::error::{backend_failure, ReconcileError, Result};
use crate::kubernetes::dynamic_api;
use crate::types::options::delete_params;
use crate::types::{ApplyOptions, DesiredState, ObservedState, PropagationPolicy, ResourceRef};
use kube::api::Patch;
use kube::Client;
use tracing::{debug, info, instrument};

/// Drives one named, namespaced object of any descriptor-defined type.
///
/// Every call makes exactly one attempt; retrying is left to the caller.
#[derive(Clone)]
pub struct Reconciler {
    client: Client,
}

impl Reconciler {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Server-side apply `desired` and return the object as the server stored it
    #[instrument(skip(self, desired, options), fields(resource = %resource, field_manager = %options.field_manager))]
    pub async fn apply(
        &self,
        resource: &ResourceRef,
        desired: &DesiredState,
        options: &ApplyOptions,
    ) -> Result<ObservedState> {
        let manifest = desired.to_manifest(resource)?;
        let api = dynamic_api(&self.client, resource);

        debug!(
            "Applying {} (force conflicts: {})",
            resource, options.force_conflicts
        );

        let object = api
            .patch(
                resource.name(),
                &options.patch_params(),
                &Patch::Apply(&manifest),
            )
            .await
            .map_err(|e| {
                let (code, message) = backend_failure(e);
                ReconcileError::ApplyError { code, message }
            })?;

        info!("Applied {}", resource);
        Ok(ObservedState::new(object))
    }

    /// Fetch the live object; `None` when it does not exist
    #[instrument(skip(self), fields(resource = %resource))]
    pub async fn read(&self, resource: &ResourceRef) -> Result<Option<ObservedState>> {
        let api = dynamic_api(&self.client, resource);

        match api.get_opt(resource.name()).await {
            Ok(Some(object)) => Ok(Some(ObservedState::new(object))),
            Ok(None) => {
                debug!("{} not found", resource);
                Ok(None)
            }
            Err(e) => {
                let (code, message) = backend_failure(e);
                Err(ReconcileError::ReadError { code, message })
            }
        }
    }

    /// Delete the object. An object that is already gone counts as deleted.
    #[instrument(skip(self), fields(resource = %resource))]
    pub async fn delete(
        &self,
        resource: &ResourceRef,
        propagation: Option<PropagationPolicy>,
    ) -> Result<()> {
        let api = dynamic_api(&self.client, resource);

        match api
            .delete(resource.name(), &delete_params(propagation))
            .await
        {
            Ok(_) => {
                info!("Deleted {}", resource);
                Ok(())
            }
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("{} already absent", resource);
                Ok(())
            }
            Err(e) => {
                let (code, message) = backend_failure(e);
                Err(ReconcileError::DeletionError { code, message })
            }
        }
    }

    /// Render the manifest `apply` would send, without contacting the cluster
    pub fn render(&self, resource: &ResourceRef, desired: &DesiredState) -> Result<String> {
        desired.render(resource)
    }
}
