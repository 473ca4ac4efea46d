//! Shared file/session data types and the native picker option shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum length the native pickers accept for an anchor id.
pub const PICKER_ID_MAX_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Metadata and decoded text content of a file read through a handle.
pub struct FileInfo {
    /// File name reported by the host.
    pub name: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME type, empty when the host cannot determine one.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Decoded text content.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Receipt returned by a successful save operation.
pub struct SaveReceipt {
    /// Content that was written.
    pub content: String,
    /// Unix-millisecond time the save completed.
    pub saved_at_unix_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Access mode requested from a file handle.
pub enum PermissionMode {
    /// Read-only access.
    Read,
    /// Read/write access.
    Readwrite,
}

impl PermissionMode {
    /// Returns the host-facing string token for this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Readwrite => "readwrite",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Permission state reported by a file handle.
pub enum PermissionState {
    /// Access is granted.
    Granted,
    /// The host will prompt the user for permission.
    Prompt,
    /// Access is denied.
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Well-known directory a picker dialog can start in.
pub enum WellKnownDirectory {
    /// The user's desktop directory.
    Desktop,
    /// The user's documents directory.
    Documents,
    /// The user's downloads directory.
    Downloads,
    /// The user's music directory.
    Music,
    /// The user's pictures directory.
    Pictures,
    /// The user's videos directory.
    Videos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One entry of a picker dialog's accepted-type list.
pub struct FileTypeFilter {
    /// Human readable description shown by the picker.
    pub description: String,
    /// MIME type the filter accepts.
    pub mime_type: String,
    /// File extensions (with leading dot) the filter accepts.
    pub extensions: Vec<String>,
}

impl FileTypeFilter {
    /// Creates a filter for `mime_type` accepting the given extensions.
    pub fn new(description: &str, mime_type: &str, extensions: &[&str]) -> Self {
        Self {
            description: description.to_string(),
            mime_type: mime_type.to_string(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }

    fn to_picker_entry(&self) -> Value {
        let mut accept = Map::new();
        accept.insert(
            self.mime_type.clone(),
            Value::Array(
                self.extensions
                    .iter()
                    .map(|ext| Value::String(ext.clone()))
                    .collect(),
            ),
        );
        let mut entry = Map::new();
        entry.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        entry.insert("accept".to_string(), Value::Object(accept));
        Value::Object(entry)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Options shared by the open and save picker dialogs.
pub struct PickerOptions {
    /// Excludes the picker's implicit all-files entry when set.
    pub exclude_accept_all: bool,
    /// Well-known directory the dialog starts in.
    pub start_in: Option<WellKnownDirectory>,
    /// Anchor id the host uses to re-open the dialog in its last directory.
    pub id: Option<String>,
    /// Accepted file types; empty allows every type.
    pub types: Vec<FileTypeFilter>,
}

impl PickerOptions {
    /// Checks the option constraints the native dialogs enforce.
    ///
    /// # Errors
    ///
    /// Returns an error when the anchor id exceeds [`PICKER_ID_MAX_LEN`]
    /// characters.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(id) = &self.id {
            if id.len() > PICKER_ID_MAX_LEN {
                return Err(format!(
                    "picker id must not be larger than {PICKER_ID_MAX_LEN} characters"
                ));
            }
        }
        Ok(())
    }

    fn base_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "excludeAcceptAllOption".to_string(),
            Value::Bool(self.exclude_accept_all),
        );
        if let Some(start_in) = self.start_in {
            map.insert("startIn".to_string(), serde_json::json!(start_in));
        }
        if let Some(id) = &self.id {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        if !self.types.is_empty() {
            map.insert(
                "types".to_string(),
                Value::Array(self.types.iter().map(FileTypeFilter::to_picker_entry).collect()),
            );
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Options for the open-file picker dialog.
pub struct OpenFileOptions {
    /// Options shared with the save dialog.
    pub picker: PickerOptions,
    /// Allows selecting more than one file; only the first is used.
    pub multiple: bool,
}

impl OpenFileOptions {
    /// Maps these options to the native open-dialog shape.
    ///
    /// # Errors
    ///
    /// Returns an error when [`PickerOptions::validate`] fails.
    pub fn to_picker_value(&self) -> Result<Value, String> {
        self.picker.validate()?;
        let mut value = self.picker.base_value();
        if let Value::Object(map) = &mut value {
            map.insert("multiple".to_string(), Value::Bool(self.multiple));
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
/// Options for the save-file picker dialog.
pub struct CreateFileOptions {
    /// Options shared with the open dialog.
    pub picker: PickerOptions,
    /// File name the dialog pre-fills.
    pub suggested_name: Option<String>,
}

impl CreateFileOptions {
    /// Maps these options to the native save-dialog shape.
    ///
    /// # Errors
    ///
    /// Returns an error when [`PickerOptions::validate`] fails.
    pub fn to_picker_value(&self) -> Result<Value, String> {
        self.picker.validate()?;
        let mut value = self.picker.base_value();
        if let Value::Object(map) = &mut value {
            if let Some(name) = &self.suggested_name {
                map.insert("suggestedName".to_string(), Value::String(name.clone()));
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn permission_enums_serialize_to_host_tokens() {
        assert_eq!(
            serde_json::to_string(&PermissionMode::Readwrite).expect("serialize"),
            "\"readwrite\""
        );
        assert_eq!(
            serde_json::to_string(&PermissionState::Prompt).expect("serialize"),
            "\"prompt\""
        );
        assert_eq!(
            serde_json::to_string(&WellKnownDirectory::Documents).expect("serialize"),
            "\"documents\""
        );
        assert_eq!(PermissionMode::Readwrite.as_str(), "readwrite");
    }

    #[test]
    fn file_info_uses_the_native_type_key() {
        let info = FileInfo {
            name: "notes.txt".to_string(),
            size: 5,
            mime_type: "text/plain".to_string(),
            content: "hello".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&info).expect("serialize"),
            json!({"name": "notes.txt", "size": 5, "type": "text/plain", "content": "hello"})
        );
    }

    #[test]
    fn open_options_map_to_the_native_dialog_shape() {
        let options = OpenFileOptions {
            picker: PickerOptions {
                exclude_accept_all: true,
                start_in: Some(WellKnownDirectory::Documents),
                id: Some("session-1".to_string()),
                types: vec![FileTypeFilter::new("Plain text", "text/plain", &[".txt"])],
            },
            multiple: false,
        };
        assert_eq!(
            options.to_picker_value().expect("map"),
            json!({
                "excludeAcceptAllOption": true,
                "startIn": "documents",
                "id": "session-1",
                "types": [{"description": "Plain text", "accept": {"text/plain": [".txt"]}}],
                "multiple": false,
            })
        );
    }

    #[test]
    fn create_options_include_the_suggested_name() {
        let options = CreateFileOptions {
            picker: PickerOptions::default(),
            suggested_name: Some("draft.txt".to_string()),
        };
        assert_eq!(
            options.to_picker_value().expect("map"),
            json!({"excludeAcceptAllOption": false, "suggestedName": "draft.txt"})
        );
    }

    #[test]
    fn over_long_picker_ids_are_rejected() {
        let options = OpenFileOptions {
            picker: PickerOptions {
                id: Some("x".repeat(PICKER_ID_MAX_LEN + 1)),
                ..PickerOptions::default()
            },
            multiple: false,
        };
        let err = options.to_picker_value().expect_err("id too long");
        assert!(err.contains("32"));
    }
}
