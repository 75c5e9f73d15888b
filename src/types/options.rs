// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Apply, delete and wait options

use crate::constants::{wait, FIELD_MANAGER};
use kube::api::{DeleteParams, PatchParams, ValidationDirective};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controls conflict resolution for server-side apply.
///
/// Field validation is always strict: unknown or duplicate fields are rejected by the server.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOptions {
    pub field_manager: String,
    #[serde(default)]
    pub force_conflicts: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            field_manager: FIELD_MANAGER.to_string(),
            force_conflicts: false,
        }
    }
}

impl ApplyOptions {
    pub fn new(field_manager: impl Into<String>, force_conflicts: bool) -> Self {
        Self {
            field_manager: field_manager.into(),
            force_conflicts,
        }
    }

    pub fn patch_params(&self) -> PatchParams {
        let mut pp = PatchParams::apply(&self.field_manager);
        pp.field_validation = Some(ValidationDirective::Strict);
        if self.force_conflicts {
            pp.force()
        } else {
            pp
        }
    }
}

/// Whether and how dependents are deleted together with an object
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropagationPolicy {
    Orphan,
    Background,
    Foreground,
}

impl From<PropagationPolicy> for kube::api::PropagationPolicy {
    fn from(policy: PropagationPolicy) -> Self {
        match policy {
            PropagationPolicy::Orphan => kube::api::PropagationPolicy::Orphan,
            PropagationPolicy::Background => kube::api::PropagationPolicy::Background,
            PropagationPolicy::Foreground => kube::api::PropagationPolicy::Foreground,
        }
    }
}

pub(crate) fn delete_params(propagation: Option<PropagationPolicy>) -> DeleteParams {
    DeleteParams {
        propagation_policy: propagation.map(Into::into),
        ..Default::default()
    }
}

fn default_timeout() -> u64 {
    wait::DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval() -> u64 {
    wait::DEFAULT_POLL_INTERVAL_SECS
}

/// One post-apply convergence check
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WaitCondition {
    pub json_path: String,
    /// When set, the value at `json_path` must equal this string.
    /// When unset, the value must exist and be non-empty.
    #[serde(default, rename = "value", skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
    #[serde(default = "default_timeout", rename = "timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_poll_interval", rename = "pollInterval")]
    pub poll_interval_seconds: u64,
}

impl WaitCondition {
    pub fn new(json_path: impl Into<String>) -> Self {
        Self {
            json_path: json_path.into(),
            expected_value: None,
            timeout_seconds: wait::DEFAULT_TIMEOUT_SECS,
            poll_interval_seconds: wait::DEFAULT_POLL_INTERVAL_SECS,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.expected_value = Some(value.into());
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64, poll_interval_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self.poll_interval_seconds = poll_interval_seconds;
        self
    }

    pub(crate) fn budget(&self) -> PollBudget {
        PollBudget::new(self.timeout_seconds, self.poll_interval_seconds)
    }
}

/// Post-delete polling budget
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteWait {
    #[serde(default = "default_timeout", rename = "timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_poll_interval", rename = "pollInterval")]
    pub poll_interval_seconds: u64,
}

impl Default for DeleteWait {
    fn default() -> Self {
        Self {
            timeout_seconds: wait::DEFAULT_TIMEOUT_SECS,
            poll_interval_seconds: wait::DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl DeleteWait {
    pub fn new(timeout_seconds: u64, poll_interval_seconds: u64) -> Self {
        Self {
            timeout_seconds,
            poll_interval_seconds,
        }
    }

    pub(crate) fn budget(&self) -> PollBudget {
        PollBudget::new(self.timeout_seconds, self.poll_interval_seconds)
    }
}

/// Timeout and poll interval of one wait, as durations.
///
/// The interval never drops below one second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PollBudget {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollBudget {
    fn new(timeout_seconds: u64, poll_interval_seconds: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_seconds),
            interval: Duration::from_secs(poll_interval_seconds.max(1)),
        }
    }

    /// A zero timeout means a single check with no sleeping
    pub fn is_single_check(&self) -> bool {
        self.timeout.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_params_without_force() {
        let pp = ApplyOptions::new("tester", false).patch_params();
        assert_eq!(pp.field_manager.as_deref(), Some("tester"));
        assert!(!pp.force);
        assert!(matches!(pp.field_validation, Some(ValidationDirective::Strict)));
    }

    #[test]
    fn test_patch_params_with_force() {
        let pp = ApplyOptions::new("tester", true).patch_params();
        assert!(pp.force);
        assert!(matches!(pp.field_validation, Some(ValidationDirective::Strict)));
    }

    #[test]
    fn test_apply_options_default_manager() {
        assert_eq!(ApplyOptions::default().field_manager, FIELD_MANAGER);
    }

    #[test]
    fn test_delete_params_propagation() {
        let dp = delete_params(Some(PropagationPolicy::Foreground));
        assert!(matches!(
            dp.propagation_policy,
            Some(kube::api::PropagationPolicy::Foreground)
        ));
        assert!(delete_params(None).propagation_policy.is_none());
    }

    #[test]
    fn test_wait_condition_defaults_from_yaml() {
        let cond: WaitCondition = serde_yaml::from_str("jsonPath: $.status.ready\n").unwrap();
        assert_eq!(cond.expected_value, None);
        assert_eq!(cond.timeout_seconds, 30);
        assert_eq!(cond.poll_interval_seconds, 5);
    }

    #[test]
    fn test_wait_condition_full_yaml() {
        let cond: WaitCondition = serde_yaml::from_str(
            "jsonPath: $.status.phase\nvalue: Running\ntimeout: 10\npollInterval: 2\n",
        )
        .unwrap();
        assert_eq!(
            cond,
            WaitCondition::new("$.status.phase")
                .with_value("Running")
                .with_timeout(10, 2)
        );
    }

    #[test]
    fn test_delete_wait_defaults() {
        let wait: DeleteWait = serde_yaml::from_str("{}").unwrap();
        assert_eq!(wait, DeleteWait::default());
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        assert_eq!(DeleteWait::new(10, 0).budget().interval, Duration::from_secs(1));
    }

    #[test]
    fn test_zero_timeout_is_single_check() {
        assert!(DeleteWait::new(0, 5).budget().is_single_check());
        assert!(!DeleteWait::new(1, 5).budget().is_single_check());
    }
}
