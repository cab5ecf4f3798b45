//! Mutating admission hook that attaches new pods to the default Multus
//! network by setting `v1.multus-cni.io/default-network`.
//!
//! [`PodDefaultNetworkHook`] is independent of any server; a host passes it
//! [`AdmissionRequest`]s and forwards the [`AdmissionResponse`]s. The
//! [`typings`] module covers the `AdmissionReview` JSON envelope.

pub mod admission;
pub mod codec;
mod error;
pub mod hook;
pub mod pod;
pub mod typings;

pub use admission::{
    AdmissionRequest, AdmissionResponse, GroupVersionResource, Operation, PatchType,
};
pub use codec::{CodecError, JsonCodec, PodCodec};
pub use error::{Error, Result};
pub use hook::{
    MutatingAdmissionHook, PodDefaultNetworkHook, DEFAULT_NETWORK, DEFAULT_NETWORK_ANNOTATION,
};
pub use pod::Pod;
