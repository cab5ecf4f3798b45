use crate::{
    admission::{AdmissionRequest, AdmissionResponse, GroupVersionResource, Operation},
    codec::{JsonCodec, PodCodec},
    error::{Error, Result},
    pod::Pod,
};

pub const DEFAULT_NETWORK_ANNOTATION: &str = "v1.multus-cni.io/default-network";
pub const DEFAULT_NETWORK: &str = "default/default";

// Resource the hook is served under, not the pods GVR it mutates. The host
// routes `/apis/<group>/<version>/<resource>` to `admit`.
const GROUP: &str = "admission.setsriovdefaultpodannotation.openshift.io";
const VERSION: &str = "v1";
const RESOURCE: &str = "setsriovdefaultpodannotations";
const SINGULAR_NAME: &str = "setsriovdefaultpodannotation";

/// What a generic admission host needs from a mutating hook.
pub trait MutatingAdmissionHook: Send + Sync {
    /// Plural resource to register the hook under, and its singular name.
    fn mutating_resource(&self) -> (GroupVersionResource, &'static str);

    /// Called once by the host before the first `admit`.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Decides on one request. The response may carry a patch for the
    /// object in the request.
    fn admit(&self, request: &AdmissionRequest) -> AdmissionResponse;
}

/// Annotates new pods with the default Multus network.
pub struct PodDefaultNetworkHook<C = JsonCodec> {
    codec: C,
}

impl PodDefaultNetworkHook {
    pub fn new() -> Self {
        PodDefaultNetworkHook::with_codec(JsonCodec)
    }
}

impl Default for PodDefaultNetworkHook {
    fn default() -> Self {
        PodDefaultNetworkHook::new()
    }
}

impl<C: PodCodec> PodDefaultNetworkHook<C> {
    pub fn with_codec(codec: C) -> Self {
        PodDefaultNetworkHook { codec }
    }

    #[tracing::instrument(skip_all, fields(pod = tracing::field::Empty))]
    pub fn set_defaults(&self, request: &AdmissionRequest) -> AdmissionResponse {
        let original = request.raw_object();
        let pod = match self.codec.decode(original) {
            Ok(pod) => pod,
            Err(e) => {
                let err = Error::Decode(e);
                tracing::error!("Failed unmarshaling object: {}", err);
                return AdmissionResponse::bad_request(err.to_string());
            }
        };
        if let Some(name) = pod.name() {
            tracing::Span::current().record("pod", name);
        }

        if !should_set_default(&pod) {
            tracing::info!("Should not set default for pod");
            return AdmissionResponse::allowed();
        }

        let mutated = mutate(&pod);
        tracing::debug!(?mutated, "Mutated object");
        match self.patch(original, &mutated) {
            Ok(patch) => {
                tracing::info!(patch = %String::from_utf8_lossy(&patch), "Patch object");
                AdmissionResponse::patched(patch)
            }
            Err(err) => {
                tracing::error!("Failed to build patch: {}", err);
                AdmissionResponse::bad_request(err.to_string())
            }
        }
    }

    /// RFC 6902 operations turning `original` into the encoded `mutated` pod.
    fn patch(&self, original: &[u8], mutated: &Pod) -> Result<Vec<u8>> {
        let current = self.codec.encode(mutated).map_err(Error::Encode)?;
        let original: serde_json::Value = serde_json::from_slice(original)?;
        let current: serde_json::Value = serde_json::from_slice(&current)?;
        let operations = json_patch::diff(&original, &current);
        Ok(serde_json::to_vec(&operations)?)
    }
}

impl<C: PodCodec> MutatingAdmissionHook for PodDefaultNetworkHook<C> {
    fn mutating_resource(&self) -> (GroupVersionResource, &'static str) {
        tracing::info!(
            group = GROUP,
            resource = RESOURCE,
            "Registering mutating REST resource"
        );
        (
            GroupVersionResource::new(GROUP, VERSION, RESOURCE),
            SINGULAR_NAME,
        )
    }

    fn initialize(&self) -> Result<()> {
        tracing::info!(
            group = GROUP,
            resource = RESOURCE,
            "Initializing validation REST resource"
        );
        Ok(())
    }

    #[tracing::instrument(
        skip_all,
        fields(
            uid = %request.uid,
            operation = %request.operation,
            group = %request.resource.group,
            version = %request.resource.version,
            resource = %request.resource.resource
        )
    )]
    fn admit(&self, request: &AdmissionRequest) -> AdmissionResponse {
        if !should_validate(request) {
            // Not a pod, so nothing for this hook to say about it.
            tracing::info!("Skipping mutation for request");
            return AdmissionResponse::allowed();
        }

        tracing::info!("Mutating request");
        if request.operation == Operation::Create {
            return self.set_defaults(request);
        }

        tracing::info!("No changes were made");
        AdmissionResponse::allowed()
    }
}

/// Guards against the hook being registered for something other than pods.
pub fn should_validate(request: &AdmissionRequest) -> bool {
    // pods live in the core group, which is the empty string
    if !request.resource.group.is_empty() {
        tracing::debug!("Returning false, not our group");
        return false;
    }

    if request.resource.resource != "pods" {
        tracing::debug!("Returning false, it's our group, but not the right resource");
        return false;
    }

    tracing::debug!("Returning true, passed all prerequisites");
    true
}

pub fn should_set_default(pod: &Pod) -> bool {
    if pod.annotation(DEFAULT_NETWORK_ANNOTATION).is_some() {
        return false;
    }

    // host-networked pods never get attached to a Multus network
    if pod.host_network() {
        return false;
    }

    true
}

fn mutate(pod: &Pod) -> Pod {
    let mut current = pod.clone();
    current.set_annotation(DEFAULT_NETWORK_ANNOTATION, DEFAULT_NETWORK);
    current
}
