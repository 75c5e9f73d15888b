// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Failed to encode resource: {0}")]
    EncodingError(String),

    #[error("Apply failed ({code}): {message}")]
    ApplyError { code: u16, message: String },

    #[error("Read failed ({code}): {message}")]
    ReadError { code: u16, message: String },

    #[error("Deletion failed ({code}): {message}")]
    DeletionError { code: u16, message: String },

    #[error("Timed out after {timeout_seconds}s waiting for {what}")]
    TimeoutExceeded { what: String, timeout_seconds: u64 },

    #[error("Wait cancelled while waiting for {0}")]
    Cancelled(String),

    #[error("Invalid resource reference: {0}")]
    InvalidReference(String),

    #[error("Invalid JSONPath expression '{expression}': {reason}")]
    InvalidJsonPath { expression: String, reason: String },

    #[error("Resource discovery failed: {0}")]
    DiscoveryError(String),
}

impl From<serde_json::Error> for ReconcileError {
    fn from(e: serde_json::Error) -> Self {
        ReconcileError::EncodingError(e.to_string())
    }
}

impl From<serde_yaml::Error> for ReconcileError {
    fn from(e: serde_yaml::Error) -> Self {
        ReconcileError::EncodingError(e.to_string())
    }
}

/// Split a kube error into the HTTP status code and message reported by the API server.
///
/// Errors that never reached the server (transport, TLS, decoding) carry code 0.
pub(crate) fn backend_failure(err: kube::Error) -> (u16, String) {
    match err {
        kube::Error::Api(resp) => (resp.code, resp.message),
        other => (0, other.to_string()),
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
