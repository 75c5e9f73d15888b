// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Apply / read / delete reconciliation with bounded convergence waits.

pub mod lifecycle;
pub mod operations;
pub mod wait;

pub use lifecycle::{DeletePhase, UpsertPhase};
pub use operations::Reconciler;
pub use wait::condition_satisfied;
