use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Decoded view of the pod under review.
///
/// Only the fields the defaulter looks at are typed. Everything else is kept
/// in the flattened `rest` maps, so encoding a snapshot reproduces the
/// original document apart from what was changed on purpose.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Pod {
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub metadata: Option<Option<PodMeta>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub spec: Option<Option<PodSpec>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PodMeta {
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub annotations: Option<Option<BTreeMap<String, String>>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PodSpec {
    #[serde(
        rename = "hostNetwork",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub host_network: Option<Option<bool>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Missing key is `None`, an explicit `null` is `Some(None)`, so encoding
/// writes back exactly what was decoded.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

impl Pod {
    pub fn meta(&self) -> Option<&PodMeta> {
        self.metadata.as_ref().and_then(Option::as_ref)
    }

    pub fn pod_spec(&self) -> Option<&PodSpec> {
        self.spec.as_ref().and_then(Option::as_ref)
    }

    pub fn name(&self) -> Option<&str> {
        self.meta()?.rest.get("name")?.as_str()
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.meta()?
            .annotations
            .as_ref()?
            .as_ref()?
            .get(key)
            .map(String::as_str)
    }

    /// `spec.hostNetwork`, absent or null counts as false.
    pub fn host_network(&self) -> bool {
        self.pod_spec()
            .and_then(|spec| spec.host_network.flatten())
            .unwrap_or(false)
    }

    /// Inserts an annotation, creating `metadata` and the annotation map
    /// when they are missing or null. Returns the previous value.
    pub fn set_annotation(&mut self, key: &str, value: &str) -> Option<String> {
        self.metadata
            .get_or_insert(None)
            .get_or_insert_with(PodMeta::default)
            .annotations
            .get_or_insert(None)
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string())
    }
}
