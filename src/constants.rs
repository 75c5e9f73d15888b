// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// The default field manager used for server-side apply
pub const FIELD_MANAGER: &str = "crd-reconciler";

/// Defaults for post-apply and post-delete polling
pub mod wait {
    /// Seconds to wait for a condition or a deletion before giving up
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    /// Seconds between two consecutive reads while waiting
    pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
}

/// Resource type discovery polling configuration
pub mod discovery {
    /// Initial polling interval in seconds when waiting for a CRD to be served
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}
