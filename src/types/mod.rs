// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource identities, object state and operation options.

pub mod catalog;
pub mod options;
pub mod resource;
pub mod state;

pub use catalog::ResourceCatalog;
pub use options::{ApplyOptions, DeleteWait, PropagationPolicy, WaitCondition};
pub use resource::{ResourceDescriptor, ResourceRef};
pub use state::{DesiredState, ObservedState};
