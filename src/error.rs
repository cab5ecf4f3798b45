use crate::codec::CodecError;

/// Failures while defaulting a pod. Each one ends the request with a
/// `BadRequest` rejection whose message is the `Display` output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Decode(#[source] CodecError),
    #[error("{0}")]
    Encode(#[source] CodecError),
    #[error("{0}")]
    Patch(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
