//! `admission.k8s.io/v1` AdmissionReview envelope.

use crate::admission::{AdmissionRequest, AdmissionResponse};
use base64::Engine as _;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;

const API_VERSION: &str = "admission.k8s.io/v1";
const KIND: &str = "AdmissionReview";

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("unexpected apiVersion {0}")]
    ApiVersion(String),
    #[error("unexpected kind {0}")]
    Kind(String),
    #[error("AdmissionReview has no request")]
    MissingRequest,
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct AdmissionReviewRequest {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    pub request: Option<AdmissionRequest>,
}

impl AdmissionReviewRequest {
    pub fn new(request: AdmissionRequest) -> Self {
        AdmissionReviewRequest {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            request: Some(request),
        }
    }

    /// Checks the envelope and hands out the request it carries.
    pub fn validate(&self) -> Result<&AdmissionRequest, ReviewError> {
        if self.api_version != API_VERSION {
            return Err(ReviewError::ApiVersion(self.api_version.clone()));
        }
        if self.kind != KIND {
            return Err(ReviewError::Kind(self.kind.clone()));
        }
        self.request.as_ref().ok_or(ReviewError::MissingRequest)
    }

    pub fn respond(&self, response: AdmissionResponse) -> AdmissionReviewResponse {
        let uid = self
            .request
            .as_ref()
            .map(|request| request.uid.clone())
            .unwrap_or_default();
        AdmissionReviewResponse::wrap(Response {
            uid,
            allowed: response.allowed,
            status: response.result,
            patch: response.patch.map(|patch| Patch {
                patch_type: response
                    .patch_type
                    .unwrap_or(crate::admission::PatchType::JsonPatch)
                    .as_str()
                    .to_string(),
                patch: base64::engine::general_purpose::STANDARD.encode(patch),
            }),
        })
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct AdmissionReviewResponse {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    pub response: Response,
}

impl AdmissionReviewResponse {
    fn wrap(response: Response) -> Self {
        AdmissionReviewResponse {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            response,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Response {
    pub uid: String,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(flatten)]
    pub patch: Option<Patch>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct Patch {
    #[serde(rename = "patchType")]
    pub patch_type: String,
    /// Base64 of the JSON patch document.
    pub patch: String,
}

impl Patch {
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.patch)
    }
}
