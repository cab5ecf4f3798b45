use crate::pod::Pod;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("there is no content to decode")]
    Empty,
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected object {api_version}, Kind={kind}, expected v1, Kind=Pod")]
    UnexpectedKind { api_version: String, kind: String },
    #[error("invalid {field}: expected a string, got {value}")]
    InvalidTypeField { field: &'static str, value: String },
}

/// Turns the raw object of an admission request into a [`Pod`] and back.
///
/// The handler receives one at construction so tests can swap it out.
pub trait PodCodec: Send + Sync {
    fn decode(&self, raw: &[u8]) -> Result<Pod, CodecError>;

    fn encode(&self, pod: &Pod) -> Result<Vec<u8>, CodecError>;
}

/// Plain JSON codec for `core/v1` pods.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl PodCodec for JsonCodec {
    fn decode(&self, raw: &[u8]) -> Result<Pod, CodecError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(CodecError::Empty);
        }
        let pod: Pod = serde_json::from_slice(raw)?;
        check_kind(&pod)?;
        Ok(pod)
    }

    fn encode(&self, pod: &Pod) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(pod)?)
    }
}

// Type information is optional in a raw object, but when present it has to
// name a core/v1 Pod.
fn check_kind(pod: &Pod) -> Result<(), CodecError> {
    let api_version = type_field(pod, "apiVersion", "v1")?;
    let kind = type_field(pod, "kind", "Pod")?;
    if api_version != "v1" || kind != "Pod" {
        return Err(CodecError::UnexpectedKind {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
        });
    }
    Ok(())
}

// Missing or null falls back to the default; anything else must be a string.
fn type_field<'a>(
    pod: &'a Pod,
    field: &'static str,
    default: &'a str,
) -> Result<&'a str, CodecError> {
    match pod.rest.get(field) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(CodecError::InvalidTypeField {
            field,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pod() {
        let raw = br#"{"apiVersion":"v1","kind":"Pod","metadata":{"name":"web"}}"#;
        let pod = JsonCodec.decode(raw).unwrap();
        assert_eq!(pod.name(), Some("web"));
    }

    #[test]
    fn decodes_untyped_object() {
        let pod = JsonCodec.decode(br#"{"metadata":{"name":"web"}}"#).unwrap();
        assert_eq!(pod.name(), Some("web"));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(JsonCodec.decode(b""), Err(CodecError::Empty)));
        assert!(matches!(JsonCodec.decode(b"  \n"), Err(CodecError::Empty)));
        assert_eq!(
            JsonCodec.decode(b"").unwrap_err().to_string(),
            "there is no content to decode"
        );
    }

    #[test]
    fn rejects_malformed_json() {
        let err = JsonCodec.decode(b"{not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }

    #[test]
    fn rejects_wrong_field_types() {
        let raw = br#"{"metadata":{"annotations":{"a":1}}}"#;
        assert!(matches!(JsonCodec.decode(raw), Err(CodecError::Json(_))));

        let raw = br#"{"spec":{"hostNetwork":"yes"}}"#;
        assert!(matches!(JsonCodec.decode(raw), Err(CodecError::Json(_))));
    }

    #[test]
    fn rejects_other_kinds() {
        let raw = br#"{"apiVersion":"apps/v1","kind":"Deployment","metadata":{}}"#;
        let err = JsonCodec.decode(raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected object apps/v1, Kind=Deployment, expected v1, Kind=Pod"
        );
    }

    #[test]
    fn rejects_non_string_type_fields() {
        let err = JsonCodec
            .decode(br#"{"apiVersion":"v1","kind":5,"metadata":{}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidTypeField { field: "kind", .. }
        ));
        assert_eq!(err.to_string(), "invalid kind: expected a string, got 5");

        let err = JsonCodec.decode(br#"{"apiVersion":true}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid apiVersion: expected a string, got true"
        );

        let err = JsonCodec.decode(br#"{"kind":{"name":"Pod"}}"#).unwrap_err();
        assert!(matches!(
            err,
            CodecError::InvalidTypeField { field: "kind", .. }
        ));
    }

    #[test]
    fn null_type_fields_default_to_pod() {
        let pod = JsonCodec
            .decode(br#"{"apiVersion":null,"kind":null,"metadata":{"name":"web"}}"#)
            .unwrap();
        assert_eq!(pod.name(), Some("web"));
    }

    #[test]
    fn encode_then_decode_keeps_pod() {
        let raw = br#"{"kind":"Pod","metadata":{"name":"web","labels":{"a":"b"}},"spec":{"containers":[]}}"#;
        let pod = JsonCodec.decode(raw).unwrap();
        let encoded = JsonCodec.encode(&pod).unwrap();
        assert_eq!(JsonCodec.decode(&encoded).unwrap(), pod);
    }
}
