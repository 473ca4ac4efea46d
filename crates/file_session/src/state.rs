//! Immutable session state snapshots.

use serde::{Deserialize, Serialize};

use crate::types::FileInfo;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Snapshot of the session's observable state.
///
/// Snapshots only change on successful operations; failure paths leave the
/// previous snapshot in place.
pub struct SessionState {
    /// File info captured by the last successful open/create, if any.
    pub opened_file: Option<FileInfo>,
    /// Whether the autosave process is currently running.
    pub autosave_running: bool,
    /// Unix-millisecond time of the last successful save.
    pub last_save_time_unix_ms: Option<u64>,
    /// Content written by the last successful save.
    pub last_save_content: Option<String>,
}

impl SessionState {
    /// Returns true when a file is recorded as opened.
    pub fn has_opened_file(&self) -> bool {
        self.opened_file.is_some()
    }

    /// Snapshot with the opened file replaced.
    pub fn with_opened_file(mut self, opened_file: Option<FileInfo>) -> Self {
        self.opened_file = opened_file;
        self
    }

    /// Snapshot with the autosave running flag replaced.
    pub fn with_autosave_running(mut self, running: bool) -> Self {
        self.autosave_running = running;
        self
    }

    /// Snapshot with the last-save time and content replaced.
    pub fn with_last_save(mut self, time_unix_ms: u64, content: String) -> Self {
        self.last_save_time_unix_ms = Some(time_unix_ms);
        self.last_save_content = Some(content);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_helpers_produce_updated_snapshots() {
        let state = SessionState::default();
        assert!(!state.has_opened_file());

        let info = FileInfo {
            name: "a.txt".to_string(),
            size: 1,
            mime_type: String::new(),
            content: "a".to_string(),
        };
        let opened = state.clone().with_opened_file(Some(info));
        assert!(opened.has_opened_file());
        assert_ne!(state, opened);

        let saved = opened.clone().with_last_save(42, "a".to_string());
        assert_eq!(saved.last_save_time_unix_ms, Some(42));
        assert_eq!(saved.last_save_content.as_deref(), Some("a"));

        let closed = saved.with_opened_file(None);
        assert!(!closed.has_opened_file());
        assert_eq!(closed.last_save_time_unix_ms, Some(42));
    }
}
