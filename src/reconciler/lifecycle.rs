// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Create/update and delete lifecycles built from the single-shot operations

use crate::error::{ReconcileError, Result};
use crate::reconciler::Reconciler;
use crate::types::{
    ApplyOptions, DeleteWait, DesiredState, ObservedState, PropagationPolicy, ResourceRef,
    WaitCondition,
};
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Phases of a create/update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertPhase {
    Pending,
    Applying,
    Applied,
    Waiting,
    Converged,
    TimedOut,
    Failed,
    Done,
}

/// Phases of a deletion
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeletePhase {
    Pending,
    Deleting,
    Deleted,
    Awaiting,
    Gone,
    TimedOut,
    Failed,
}

impl fmt::Display for UpsertPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for DeletePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn enter(resource: &ResourceRef, phase: impl fmt::Display) {
    debug!("{} entered phase {}", resource, phase);
}

impl Reconciler {
    /// Apply `desired`, then wait for `wait` if given.
    ///
    /// After a wait the object is read again so the returned state reflects the converged
    /// object. If that read fails or finds nothing, the apply response is returned instead.
    /// A timed out wait is an error, but the object stays applied.
    #[instrument(skip(self, desired, options, wait, cancel), fields(resource = %resource))]
    pub async fn upsert(
        &self,
        resource: &ResourceRef,
        desired: &DesiredState,
        options: &ApplyOptions,
        wait: Option<&[WaitCondition]>,
        cancel: &CancellationToken,
    ) -> Result<ObservedState> {
        enter(resource, UpsertPhase::Pending);

        enter(resource, UpsertPhase::Applying);
        let applied = match self.apply(resource, desired, options).await {
            Ok(observed) => observed,
            Err(e) => {
                enter(resource, UpsertPhase::Failed);
                return Err(e);
            }
        };
        enter(resource, UpsertPhase::Applied);

        let Some(conditions) = wait.filter(|c| !c.is_empty()) else {
            enter(resource, UpsertPhase::Done);
            return Ok(applied);
        };

        enter(resource, UpsertPhase::Waiting);
        if let Err(e) = self.await_condition(resource, conditions, cancel).await {
            if matches!(e, ReconcileError::TimeoutExceeded { .. }) {
                enter(resource, UpsertPhase::TimedOut);
            }
            return Err(e);
        }
        enter(resource, UpsertPhase::Converged);

        let observed = match self.read(resource).await {
            Ok(Some(converged)) => converged,
            Ok(None) => applied,
            Err(e) => {
                warn!("Could not re-read {} after it converged: {}", resource, e);
                applied
            }
        };
        enter(resource, UpsertPhase::Done);
        Ok(observed)
    }

    /// Delete the object, then wait for it to disappear if `wait` is given
    #[instrument(skip(self, wait, cancel), fields(resource = %resource))]
    pub async fn remove(
        &self,
        resource: &ResourceRef,
        propagation: Option<PropagationPolicy>,
        wait: Option<&DeleteWait>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        enter(resource, DeletePhase::Pending);

        enter(resource, DeletePhase::Deleting);
        if let Err(e) = self.delete(resource, propagation).await {
            enter(resource, DeletePhase::Failed);
            return Err(e);
        }
        enter(resource, DeletePhase::Deleted);

        let Some(wait) = wait else {
            return Ok(());
        };

        enter(resource, DeletePhase::Awaiting);
        if let Err(e) = self.await_deletion(resource, wait, cancel).await {
            if matches!(e, ReconcileError::TimeoutExceeded { .. }) {
                enter(resource, DeletePhase::TimedOut);
            }
            return Err(e);
        }
        enter(resource, DeletePhase::Gone);

        Ok(())
    }
}
