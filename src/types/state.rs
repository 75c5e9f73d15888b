// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Desired and observed object state

use crate::error::{ReconcileError, Result};
use crate::types::resource::ResourceRef;
use kube::api::DynamicObject;
use kube::ResourceExt;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// The caller's declaration of an object: labels, annotations and an arbitrary spec document.
///
/// The envelope (apiVersion, kind, name, namespace) is taken from the `ResourceRef`
/// the state is applied to, so body and endpoint always agree.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesiredState {
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub spec: Value,
}

impl DesiredState {
    pub fn new(spec: Value) -> Self {
        Self {
            spec,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Build the full object envelope for `resource`.
    ///
    /// The spec must be a map or absent (null); anything else cannot form a valid object.
    pub fn to_manifest(&self, resource: &ResourceRef) -> Result<Value> {
        let descriptor = resource.descriptor();

        let mut metadata = Map::new();
        metadata.insert("name".into(), json!(resource.name()));
        metadata.insert("namespace".into(), json!(resource.namespace()));
        if !self.labels.is_empty() {
            metadata.insert("labels".into(), serde_json::to_value(&self.labels)?);
        }
        if !self.annotations.is_empty() {
            metadata.insert("annotations".into(), serde_json::to_value(&self.annotations)?);
        }

        let mut manifest = Map::new();
        manifest.insert("apiVersion".into(), json!(descriptor.api_version()));
        manifest.insert("kind".into(), json!(descriptor.kind));
        manifest.insert("metadata".into(), Value::Object(metadata));

        match &self.spec {
            Value::Null => {}
            Value::Object(_) => {
                manifest.insert("spec".into(), self.spec.clone());
            }
            other => {
                return Err(ReconcileError::EncodingError(format!(
                    "spec of {} must be a map, got {}",
                    resource,
                    json_type_name(other)
                )))
            }
        }

        Ok(Value::Object(manifest))
    }

    /// Render the envelope as YAML without contacting the cluster
    pub fn render(&self, resource: &ResourceRef) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_manifest(resource)?)?)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

/// The live object as returned by the API server.
///
/// Server-populated metadata, defaulted spec fields and status are all included.
#[derive(Clone, Debug)]
pub struct ObservedState {
    object: DynamicObject,
}

impl ObservedState {
    pub fn new(object: DynamicObject) -> Self {
        Self { object }
    }

    pub fn object(&self) -> &DynamicObject {
        &self.object
    }

    pub fn name(&self) -> String {
        self.object.name_any()
    }

    pub fn spec(&self) -> Option<&Value> {
        self.object.data.get("spec")
    }

    pub fn status(&self) -> Option<&Value> {
        self.object.data.get("status")
    }

    /// The whole object as one JSON document, envelope included
    pub fn to_document(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.object)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.object)?)
    }
}

impl From<DynamicObject> for ObservedState {
    fn from(object: DynamicObject) -> Self {
        Self::new(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resource::ResourceDescriptor;

    fn demo_ref() -> ResourceRef {
        ResourceRef::new(
            ResourceDescriptor::new("iot.eclipse.org", "v1alpha1", "Ditto", "dittos"),
            "default",
            "demo",
        )
        .unwrap()
    }

    #[test]
    fn test_to_manifest_builds_envelope() {
        let desired = DesiredState::new(json!({"ingress": {"host": "example.com"}}));

        let manifest = desired.to_manifest(&demo_ref()).unwrap();

        assert_eq!(manifest["apiVersion"], "iot.eclipse.org/v1alpha1");
        assert_eq!(manifest["kind"], "Ditto");
        assert_eq!(manifest["metadata"]["name"], "demo");
        assert_eq!(manifest["metadata"]["namespace"], "default");
        assert_eq!(manifest["spec"]["ingress"]["host"], "example.com");
    }

    #[test]
    fn test_to_manifest_omits_empty_labels_and_annotations() {
        let manifest = DesiredState::new(json!({}))
            .to_manifest(&demo_ref())
            .unwrap();

        assert!(manifest["metadata"].get("labels").is_none());
        assert!(manifest["metadata"].get("annotations").is_none());
    }

    #[test]
    fn test_to_manifest_includes_labels_and_annotations() {
        let manifest = DesiredState::new(json!({}))
            .with_label("app", "ditto")
            .with_annotation("team", "iot")
            .to_manifest(&demo_ref())
            .unwrap();

        assert_eq!(manifest["metadata"]["labels"]["app"], "ditto");
        assert_eq!(manifest["metadata"]["annotations"]["team"], "iot");
    }

    #[test]
    fn test_to_manifest_null_spec_is_omitted() {
        let manifest = DesiredState::default().to_manifest(&demo_ref()).unwrap();
        assert!(manifest.get("spec").is_none());
    }

    #[test]
    fn test_to_manifest_rejects_scalar_spec() {
        let err = DesiredState::new(json!("nope"))
            .to_manifest(&demo_ref())
            .unwrap_err();
        assert!(matches!(err, ReconcileError::EncodingError(_)));
    }

    #[test]
    fn test_render_produces_yaml() {
        let yaml = DesiredState::new(json!({"ingress": {"host": "example.com"}}))
            .render(&demo_ref())
            .unwrap();

        let parsed: Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["kind"], "Ditto");
        assert_eq!(parsed["spec"]["ingress"]["host"], "example.com");
    }

    #[test]
    fn test_observed_state_accessors() {
        let object: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "iot.eclipse.org/v1alpha1",
            "kind": "Ditto",
            "metadata": {"name": "demo", "namespace": "default", "uid": "abc"},
            "spec": {"ingress": {"host": "example.com"}},
            "status": {"ready": true}
        }))
        .unwrap();

        let observed = ObservedState::from(object);

        assert_eq!(observed.name(), "demo");
        assert_eq!(observed.spec().unwrap()["ingress"]["host"], "example.com");
        assert_eq!(observed.status().unwrap()["ready"], true);
        let doc = observed.to_document().unwrap();
        assert_eq!(doc["metadata"]["uid"], "abc");
        assert_eq!(doc["kind"], "Ditto");
    }
}
