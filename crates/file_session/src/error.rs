//! Session error records with one stable enumerated kind set.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::host::HostFailure;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Stable kind of a failed session operation.
///
/// Each kind carries one canonical string code; host exception names are
/// classified into this set case-insensitively and unrecognized names fall
/// back to [`SessionErrorKind::Unknown`].
pub enum SessionErrorKind {
    /// The user dismissed a picker dialog or the host aborted the call.
    Abort,
    /// Save or close was attempted while no file reference is held.
    MissingFile,
    /// The host could not find the selected file.
    NotFound,
    /// The user declined the read-write permission prompt.
    PermissionNotGranted,
    /// The host blocked the call for security reasons.
    Security,
    /// The host could not acquire a lock on the file.
    NoModificationAllowed,
    /// The handle lacks the permission required for the operation.
    NotAllowed,
    /// The picker options could not be processed.
    InvalidFileTypes,
    /// Any host failure outside the recognized set.
    Unknown,
}

impl SessionErrorKind {
    const ALL: [Self; 9] = [
        Self::Abort,
        Self::MissingFile,
        Self::NotFound,
        Self::PermissionNotGranted,
        Self::Security,
        Self::NoModificationAllowed,
        Self::NotAllowed,
        Self::InvalidFileTypes,
        Self::Unknown,
    ];

    /// Returns the stable string code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::Abort => "AbortError",
            Self::MissingFile => "MissingFileError",
            Self::NotFound => "NotFoundError",
            Self::PermissionNotGranted => "PermissionNotGrantedError",
            Self::Security => "SecurityError",
            Self::NoModificationAllowed => "NoModificationAllowedError",
            Self::NotAllowed => "NotAllowedError",
            Self::InvalidFileTypes => "TypeError",
            Self::Unknown => "UnknownError",
        }
    }

    /// Classifies a host exception name into a kind.
    pub fn from_code(code: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(code))
            .unwrap_or(Self::Unknown)
    }
}

impl Serialize for SessionErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for SessionErrorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{}: {}", .kind.code(), .message)]
/// Failure record returned by every session operation.
///
/// Serializes to the uniform `{"error": <code>, "message": <detail>}` record
/// shape.
pub struct SessionError {
    /// Stable error kind.
    #[serde(rename = "error")]
    pub kind: SessionErrorKind,
    /// Human readable detail from the host or this crate.
    pub message: String,
}

impl SessionError {
    /// Creates an error of the given kind.
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<HostFailure> for SessionError {
    fn from(failure: HostFailure) -> Self {
        Self {
            kind: SessionErrorKind::from_code(&failure.name),
            message: failure.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn kinds_round_trip_through_their_codes() {
        for kind in SessionErrorKind::ALL {
            assert_eq!(SessionErrorKind::from_code(kind.code()), kind);
        }
        assert_eq!(
            SessionErrorKind::from_code("aborterror"),
            SessionErrorKind::Abort
        );
        assert_eq!(
            SessionErrorKind::from_code("SomethingNew"),
            SessionErrorKind::Unknown
        );
    }

    #[test]
    fn errors_serialize_to_the_record_shape() {
        let err = SessionError::new(SessionErrorKind::MissingFile, "There is no file to close");
        assert_eq!(
            serde_json::to_value(&err).expect("serialize"),
            json!({"error": "MissingFileError", "message": "There is no file to close"})
        );
        let parsed: SessionError =
            serde_json::from_value(json!({"error": "AbortError", "message": "dismissed"}))
                .expect("deserialize");
        assert_eq!(parsed.kind, SessionErrorKind::Abort);
    }

    #[test]
    fn host_failures_classify_by_name() {
        let err = SessionError::from(HostFailure::new("NotAllowedError", "write blocked"));
        assert_eq!(err.kind, SessionErrorKind::NotAllowed);
        assert_eq!(err.message, "write blocked");

        let err = SessionError::from(HostFailure::new("WeirdHostError", "boom"));
        assert_eq!(err.kind, SessionErrorKind::Unknown);
        assert_eq!(err.to_string(), "UnknownError: boom");
    }
}
