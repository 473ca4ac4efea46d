//! Host file-access service contracts.

use std::{future::Future, pin::Pin, rc::Rc};

use crate::types::{CreateFileOptions, FileInfo, OpenFileOptions, PermissionMode, PermissionState};

/// Object-safe boxed future used by the host file-access traits.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Named failure surfaced by a host file-access call.
///
/// The name carries the host exception name (for example `AbortError` when
/// the user dismisses a picker dialog).
pub struct HostFailure {
    /// Exception name reported by the host.
    pub name: String,
    /// Human readable detail.
    pub message: String,
}

impl HostFailure {
    /// Creates a failure from a host exception name and message.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Host dialog service producing file handles from the native pickers.
pub trait FilePickerService {
    /// Opens the save-file picker and returns the chosen handle.
    fn pick_create_file<'a>(
        &'a self,
        options: &'a CreateFileOptions,
    ) -> HostFuture<'a, Result<Rc<dyn FileHandle>, HostFailure>>;

    /// Opens the open-file picker and returns the selected handles.
    fn pick_open_files<'a>(
        &'a self,
        options: &'a OpenFileOptions,
    ) -> HostFuture<'a, Result<Vec<Rc<dyn FileHandle>>, HostFailure>>;
}

/// Capability handle for one user-selected file.
pub trait FileHandle {
    /// Base name of the file.
    fn name(&self) -> String;

    /// Queries the current permission state without prompting the user.
    fn query_permission<'a>(&'a self, mode: PermissionMode) -> HostFuture<'a, PermissionState>;

    /// Requests permission, prompting the user when necessary.
    fn request_permission<'a>(&'a self, mode: PermissionMode) -> HostFuture<'a, PermissionState>;

    /// Reads the file's metadata and decoded text content.
    fn read_file<'a>(&'a self) -> HostFuture<'a, Result<FileInfo, HostFailure>>;

    /// Acquires a writable stream replacing the file's content on close.
    fn create_writable<'a>(&'a self)
        -> HostFuture<'a, Result<Box<dyn FileWritable>, HostFailure>>;
}

impl std::fmt::Debug for dyn FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name())
            .finish()
    }
}

/// Writable stream over a file handle; content becomes durable at close.
pub trait FileWritable {
    /// Writes text at the stream cursor (whole-file overwrite on commit).
    fn write_text<'a>(&'a mut self, text: &'a str) -> HostFuture<'a, Result<(), HostFailure>>;

    /// Closes the stream, committing the written content.
    fn close<'a>(&'a mut self) -> HostFuture<'a, Result<(), HostFailure>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op picker adapter for unsupported targets and baseline tests.
pub struct NoopFilePicker;

impl NoopFilePicker {
    fn unavailable(op: &str) -> HostFailure {
        HostFailure::new("NotSupportedError", format!("file picker unavailable: {op}"))
    }
}

impl FilePickerService for NoopFilePicker {
    fn pick_create_file<'a>(
        &'a self,
        _options: &'a CreateFileOptions,
    ) -> HostFuture<'a, Result<Rc<dyn FileHandle>, HostFailure>> {
        Box::pin(async { Err(Self::unavailable("pick_create_file")) })
    }

    fn pick_open_files<'a>(
        &'a self,
        _options: &'a OpenFileOptions,
    ) -> HostFuture<'a, Result<Vec<Rc<dyn FileHandle>>, HostFailure>> {
        Box::pin(async { Err(Self::unavailable("pick_open_files")) })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn noop_picker_reports_unavailable() {
        let picker = NoopFilePicker;
        let picker_obj: &dyn FilePickerService = &picker;

        let err = block_on(picker_obj.pick_open_files(&OpenFileOptions::default()))
            .expect_err("open should fail");
        assert_eq!(err.name, "NotSupportedError");
        assert!(err.message.contains("pick_open_files"));

        let err = block_on(picker_obj.pick_create_file(&CreateFileOptions::default()))
            .expect_err("create should fail");
        assert!(err.message.contains("pick_create_file"));
    }
}
