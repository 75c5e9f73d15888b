// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! CRD availability checking utilities

use crate::constants::discovery::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::{ReconcileError, Result};
use crate::types::ResourceDescriptor;
use kube::Client;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Wait for a resource type to be served by the API server.
/// This uses exponential backoff starting at POLL_INTERVAL_SECS seconds.
#[instrument(skip(client, cancel), fields(resource = %descriptor))]
pub async fn wait_for_resource(
    client: &Client,
    descriptor: &ResourceDescriptor,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut interval = POLL_INTERVAL_SECS;

    loop {
        match resource_served(client, descriptor).await {
            Ok(true) => {
                info!("Resource type {} is available", descriptor);
                return Ok(());
            }
            Ok(false) => {
                info!(
                    "Resource type {} not yet available, waiting {} seconds...",
                    descriptor, interval
                );
            }
            Err(e) => {
                warn!(
                    "Error checking for resource type {}: {}, retrying in {} seconds...",
                    descriptor, e, interval
                );
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(ReconcileError::Cancelled(format!("resource type {}", descriptor)));
            }
            _ = sleep(Duration::from_secs(interval)) => {}
        }

        // Exponential backoff with max cap
        interval = (interval * 2).min(POLL_MAX_INTERVAL_SECS);
    }
}

/// Check whether the group/version of `descriptor` serves its plural.
///
/// A group/version the server does not know at all counts as "not served".
pub async fn resource_served(client: &Client, descriptor: &ResourceDescriptor) -> Result<bool> {
    let listed = if descriptor.group.is_empty() {
        client.list_core_api_resources(&descriptor.version).await
    } else {
        client
            .list_api_group_resources(&descriptor.api_version())
            .await
    };

    match listed {
        Ok(list) => Ok(list.resources.iter().any(|r| r.name == descriptor.plural)),
        Err(kube::Error::Api(err)) if err.code == 404 => Ok(false),
        Err(e) => Err(ReconcileError::DiscoveryError(format!(
            "Failed to list resources of {}: {}",
            descriptor.api_version(),
            e
        ))),
    }
}
