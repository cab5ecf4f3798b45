use anyhow::Context as _;
use sriov_defaults::{
    typings::{AdmissionReviewRequest, AdmissionReviewResponse},
    MutatingAdmissionHook,
};

/// Runs one serialized `AdmissionReview` through `hook`.
pub fn review<H: MutatingAdmissionHook>(
    hook: &H,
    input: &[u8],
) -> anyhow::Result<AdmissionReviewResponse> {
    let review: AdmissionReviewRequest =
        serde_json::from_slice(input).context("failed to parse AdmissionReview")?;
    let request = review.validate()?;
    tracing::debug!(
        uid = request.uid.as_str(),
        namespace = request.namespace.as_deref().unwrap_or_default(),
        name = request.name.as_deref().unwrap_or_default(),
        "received admission request"
    );
    let response = hook.admit(request);
    if let Some(status) = &response.result {
        tracing::warn!(
            "request rejected: {}",
            status.message.as_deref().unwrap_or_default()
        );
    }
    Ok(review.respond(response))
}

pub fn render(review: &AdmissionReviewResponse, pretty: bool) -> anyhow::Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(review)
    } else {
        serde_json::to_string(review)
    };
    text.context("failed to serialize AdmissionReview")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sriov_defaults::PodDefaultNetworkHook;

    const CREATE_POD: &str = r#"{
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "0df28fbd-5f5f-11e8-bc74-36e6bb280816",
            "resource": {"group": "", "version": "v1", "resource": "pods"},
            "operation": "CREATE",
            "namespace": "default",
            "object": {"apiVersion": "v1", "kind": "Pod", "metadata": {"name": "web"}, "spec": {"containers": []}}
        }
    }"#;

    #[test]
    fn reviews_create() {
        let resp = review(&PodDefaultNetworkHook::new(), CREATE_POD.as_bytes()).unwrap();
        assert_eq!(resp.response.uid, "0df28fbd-5f5f-11e8-bc74-36e6bb280816");
        assert!(resp.response.allowed);
        let patch = resp.response.patch.as_ref().unwrap();
        assert_eq!(patch.patch_type, "JSONPatch");
        let ops: serde_json::Value = serde_json::from_slice(&patch.decode().unwrap()).unwrap();
        assert_eq!(ops[0]["path"], "/metadata/annotations");
    }

    #[test]
    fn rejects_bad_envelope() {
        let input = CREATE_POD.replace("admission.k8s.io/v1", "admission.k8s.io/v1beta1");
        let err = review(&PodDefaultNetworkHook::new(), input.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "unexpected apiVersion admission.k8s.io/v1beta1");

        let err = review(&PodDefaultNetworkHook::new(), b"{").unwrap_err();
        assert_eq!(err.to_string(), "failed to parse AdmissionReview");
    }

    #[test]
    fn renders_compact_and_pretty() {
        let resp = review(&PodDefaultNetworkHook::new(), CREATE_POD.as_bytes()).unwrap();
        let compact = render(&resp, false).unwrap();
        assert!(!compact.contains('\n'));
        let pretty = render(&resp, true).unwrap();
        assert!(pretty.contains('\n'));
        let a: serde_json::Value = serde_json::from_str(&compact).unwrap();
        let b: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(a, b);
    }
}
