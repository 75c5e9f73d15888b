// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded, cancellable polling for post-apply and post-delete convergence

use crate::error::{ReconcileError, Result};
use crate::jsonpath::{scalar_string, JsonPath};
use crate::reconciler::Reconciler;
use crate::types::options::PollBudget;
use crate::types::{DeleteWait, ResourceRef, WaitCondition};
use serde_json::Value;
use std::future::Future;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

impl Reconciler {
    /// Wait for every condition in order. The first one that times out stops the wait.
    ///
    /// All JSONPath expressions are parsed before the first read.
    #[instrument(skip(self, conditions, cancel), fields(resource = %resource))]
    pub async fn await_condition(
        &self,
        resource: &ResourceRef,
        conditions: &[WaitCondition],
        cancel: &CancellationToken,
    ) -> Result<()> {
        let paths = conditions
            .iter()
            .map(|c| JsonPath::parse(&c.json_path))
            .collect::<Result<Vec<_>>>()?;

        for (condition, path) in conditions.iter().zip(&paths) {
            let what = describe_condition(resource, condition);
            let converged = poll_until(&what, condition.budget(), cancel, || {
                self.check_condition(resource, condition, path)
            })
            .await?;

            if !converged {
                warn!("Gave up waiting for {}", what);
                return Err(ReconcileError::TimeoutExceeded {
                    what,
                    timeout_seconds: condition.timeout_seconds,
                });
            }
            info!("Condition met: {}", what);
        }

        Ok(())
    }

    /// Wait until the object is gone.
    ///
    /// A zero timeout checks once and succeeds whatever that check finds, a
    /// failed read included. Cancellation is still reported.
    #[instrument(skip(self, wait, cancel), fields(resource = %resource))]
    pub async fn await_deletion(
        &self,
        resource: &ResourceRef,
        wait: &DeleteWait,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let what = format!("deletion of {}", resource);
        let budget = wait.budget();

        let gone = match poll_until(&what, budget, cancel, || async {
            self.read(resource).await.map(|observed| observed.is_none())
        })
        .await
        {
            Err(ReconcileError::ReadError { code, message }) if budget.is_single_check() => {
                warn!(code, "Could not check {}, not waiting: {}", resource, message);
                return Ok(());
            }
            result => result?,
        };

        if gone {
            info!("{} is gone", resource);
            Ok(())
        } else if budget.is_single_check() {
            debug!("{} still present, not waiting", resource);
            Ok(())
        } else {
            warn!("Gave up waiting for {}", what);
            Err(ReconcileError::TimeoutExceeded {
                what,
                timeout_seconds: wait.timeout_seconds,
            })
        }
    }

    async fn check_condition(
        &self,
        resource: &ResourceRef,
        condition: &WaitCondition,
        path: &JsonPath,
    ) -> Result<bool> {
        let Some(observed) = self.read(resource).await? else {
            debug!("{} does not exist yet", resource);
            return Ok(false);
        };

        let document = observed.to_document()?;
        let found = path.find(&document);
        debug!("{} is {:?}", path, found);

        let expected = condition.expected_value.as_deref();
        Ok(found
            .into_iter()
            .any(|value| condition_satisfied(Some(value), expected)))
    }
}

/// Run `check` until it reports true or the budget runs out.
///
/// Returns `Ok(false)` when the budget is exhausted. The sleep before the last
/// check is shortened so that check lands on the deadline.
async fn poll_until<F, Fut>(
    what: &str,
    budget: PollBudget,
    cancel: &CancellationToken,
    mut check: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let satisfied = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ReconcileError::Cancelled(what.to_string())),
            result = check() => result?,
        };

        if satisfied {
            debug!(attempt, "{} satisfied", what);
            return Ok(true);
        }
        if budget.is_single_check() {
            return Ok(false);
        }

        let elapsed = start.elapsed();
        if elapsed >= budget.timeout {
            return Ok(false);
        }

        let pause = budget.interval.min(budget.timeout - elapsed);
        debug!(attempt, "{} not yet satisfied, checking again in {:?}", what, pause);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ReconcileError::Cancelled(what.to_string())),
            _ = sleep(pause) => {}
        }
    }
}

/// With an expected value the string forms must match; without one the value must be non-empty
pub fn condition_satisfied(value: Option<&Value>, expected: Option<&str>) -> bool {
    match (value, expected) {
        (None, _) => false,
        (Some(value), Some(expected)) => scalar_string(value) == expected,
        (Some(value), None) => !is_empty(value),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn describe_condition(resource: &ResourceRef, condition: &WaitCondition) -> String {
    match &condition.expected_value {
        Some(expected) => format!("{} == '{}' on {}", condition.json_path, expected, resource),
        None => format!("{} to be set on {}", condition.json_path, resource),
    }
}
