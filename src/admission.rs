//! Request and response values exchanged with the admission host.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use serde_json::value::RawValue;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Connect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies an API resource. The core group is the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct GroupVersionResource {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    pub fn new(group: &str, version: &str, resource: &str) -> Self {
        GroupVersionResource {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        }
    }

    pub fn pods() -> Self {
        GroupVersionResource::new("", "v1", "pods")
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}, Resource={}",
            self.group, self.version, self.resource
        )
    }
}

/// The part of an `AdmissionReview` the hook acts on.
///
/// `object` is kept as the exact JSON text the API server sent.
#[derive(Clone, Debug, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub uid: String,
    pub resource: GroupVersionResource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_resource: Option<String>,
    pub operation: Operation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl AdmissionRequest {
    pub fn new(uid: &str, operation: Operation, resource: GroupVersionResource) -> Self {
        AdmissionRequest {
            uid: uid.to_string(),
            resource,
            sub_resource: None,
            operation,
            name: None,
            namespace: None,
            object: None,
            dry_run: None,
        }
    }

    pub fn with_object(mut self, object: Box<RawValue>) -> Self {
        self.object = Some(object);
        self
    }

    /// Raw bytes of the admitted object, empty when the request carries none.
    pub fn raw_object(&self) -> &[u8] {
        self.object
            .as_deref()
            .map(|raw| raw.get().as_bytes())
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum PatchType {
    #[serde(rename = "JSONPatch")]
    JsonPatch,
}

impl PatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            PatchType::JsonPatch => "JSONPatch",
        }
    }
}

/// Outcome of one admission request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdmissionResponse {
    pub allowed: bool,
    /// Serialized RFC 6902 operation list.
    pub patch: Option<Vec<u8>>,
    pub patch_type: Option<PatchType>,
    pub result: Option<Status>,
}

impl AdmissionResponse {
    pub fn allowed() -> Self {
        AdmissionResponse {
            allowed: true,
            ..Default::default()
        }
    }

    pub fn patched(patch: Vec<u8>) -> Self {
        AdmissionResponse {
            allowed: true,
            patch: Some(patch),
            patch_type: Some(PatchType::JsonPatch),
            result: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AdmissionResponse {
            allowed: false,
            patch: None,
            patch_type: None,
            result: Some(Status {
                status: Some("Failure".to_string()),
                code: Some(400),
                reason: Some("BadRequest".to_string()),
                message: Some(message.into()),
                ..Default::default()
            }),
        }
    }

    pub fn is_patched(&self) -> bool {
        self.patch.is_some()
    }
}
