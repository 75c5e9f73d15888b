// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crd_reconciler::config::Config;
use crd_reconciler::kubernetes::wait_for_resource;
use crd_reconciler::reconciler::Reconciler;
use crd_reconciler::request::{run_request, Action, ReconcileRequest};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: request={}, field_manager={}, force_conflicts={}",
        config.request_path.display(),
        config.field_manager,
        config.force_conflicts
    );

    let catalog = config.load_catalog()?;
    let document = std::fs::read_to_string(&config.request_path)
        .with_context(|| format!("Failed to read request {}", config.request_path.display()))?;
    let request = ReconcileRequest::from_yaml(&document)?;

    if request.action == Action::Render {
        let manifest = request
            .desired_state()
            .render(&request.resource_ref(&catalog)?)?;
        println!("{}", manifest);
        return Ok(());
    }

    // Interrupt long waits on Ctrl-C
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    if config.wait_for_resource && request.action.needs_served_resource() {
        let descriptor = request.descriptor(&catalog)?;
        info!("Waiting for resource type {} to become available...", descriptor);
        wait_for_resource(&client, &descriptor, &cancel).await?;
    }

    let reconciler = Reconciler::new(client);
    match run_request(&reconciler, &request, &catalog, &config.apply_options(), &cancel).await? {
        Some(output) => println!("{}", output),
        None => info!("Request completed"),
    }

    Ok(())
}
