//! In-memory host doubles for session tests.

use std::{cell::RefCell, rc::Rc};

use crate::host::service::{FileHandle, FilePickerService, FileWritable, HostFailure, HostFuture};
use crate::types::{CreateFileOptions, FileInfo, OpenFileOptions, PermissionMode, PermissionState};

#[derive(Debug)]
struct MemoryFileData {
    name: String,
    mime_type: String,
    content: String,
    query_result: PermissionState,
    request_result: PermissionState,
    read_calls: u32,
    write_commits: u32,
    read_failure: Option<HostFailure>,
    writable_failure: Option<HostFailure>,
}

#[derive(Debug, Clone)]
/// Scriptable in-memory file handle double.
///
/// Clones share the same backing data, so tests can keep a copy to inspect
/// content and call counts after handing the file to a picker.
pub struct MemoryFile {
    inner: Rc<RefCell<MemoryFileData>>,
}

impl MemoryFile {
    /// Creates a file with the given name, MIME type and content.
    ///
    /// Permission queries and requests both resolve to granted until
    /// rescripted with [`MemoryFile::with_permissions`].
    pub fn new(name: &str, mime_type: &str, content: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryFileData {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                content: content.to_string(),
                query_result: PermissionState::Granted,
                request_result: PermissionState::Granted,
                read_calls: 0,
                write_commits: 0,
                read_failure: None,
                writable_failure: None,
            })),
        }
    }

    /// Scripts the outcomes of the permission query and request calls.
    pub fn with_permissions(self, query: PermissionState, request: PermissionState) -> Self {
        {
            let mut data = self.inner.borrow_mut();
            data.query_result = query;
            data.request_result = request;
        }
        self
    }

    /// Makes reads fail with the given host failure.
    pub fn fail_reads_with(&self, failure: HostFailure) {
        self.inner.borrow_mut().read_failure = Some(failure);
    }

    /// Makes writable acquisition fail with the given host failure.
    pub fn fail_writes_with(&self, failure: HostFailure) {
        self.inner.borrow_mut().writable_failure = Some(failure);
    }

    /// Current stored content.
    pub fn content(&self) -> String {
        self.inner.borrow().content.clone()
    }

    /// Number of times the file was read.
    pub fn read_calls(&self) -> u32 {
        self.inner.borrow().read_calls
    }

    /// Number of writable streams committed on close.
    pub fn write_commits(&self) -> u32 {
        self.inner.borrow().write_commits
    }
}

impl FileHandle for MemoryFile {
    fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    fn query_permission<'a>(&'a self, _mode: PermissionMode) -> HostFuture<'a, PermissionState> {
        Box::pin(async move { self.inner.borrow().query_result })
    }

    fn request_permission<'a>(&'a self, _mode: PermissionMode) -> HostFuture<'a, PermissionState> {
        Box::pin(async move { self.inner.borrow().request_result })
    }

    fn read_file<'a>(&'a self) -> HostFuture<'a, Result<FileInfo, HostFailure>> {
        Box::pin(async move {
            let mut data = self.inner.borrow_mut();
            data.read_calls += 1;
            if let Some(failure) = data.read_failure.clone() {
                return Err(failure);
            }
            Ok(FileInfo {
                name: data.name.clone(),
                size: data.content.len() as u64,
                mime_type: data.mime_type.clone(),
                content: data.content.clone(),
            })
        })
    }

    fn create_writable<'a>(
        &'a self,
    ) -> HostFuture<'a, Result<Box<dyn FileWritable>, HostFailure>> {
        Box::pin(async move {
            if let Some(failure) = self.inner.borrow().writable_failure.clone() {
                return Err(failure);
            }
            Ok(Box::new(MemoryFileWritable {
                target: Rc::clone(&self.inner),
                buffer: String::new(),
            }) as Box<dyn FileWritable>)
        })
    }
}

/// Buffered writable replacing the target file's content when closed.
struct MemoryFileWritable {
    target: Rc<RefCell<MemoryFileData>>,
    buffer: String,
}

impl FileWritable for MemoryFileWritable {
    fn write_text<'a>(&'a mut self, text: &'a str) -> HostFuture<'a, Result<(), HostFailure>> {
        Box::pin(async move {
            self.buffer.push_str(text);
            Ok(())
        })
    }

    fn close<'a>(&'a mut self) -> HostFuture<'a, Result<(), HostFailure>> {
        Box::pin(async move {
            let mut data = self.target.borrow_mut();
            data.content = std::mem::take(&mut self.buffer);
            data.write_commits += 1;
            Ok(())
        })
    }
}

#[derive(Debug, Default)]
struct PickerData {
    selection: Vec<MemoryFile>,
    failure: Option<HostFailure>,
    create_calls: u32,
    open_calls: u32,
    last_create_options: Option<CreateFileOptions>,
    last_open_options: Option<OpenFileOptions>,
}

#[derive(Debug, Clone, Default)]
/// Scriptable in-memory picker used as the host dialog double.
pub struct MemoryFilePicker {
    inner: Rc<RefCell<PickerData>>,
}

impl MemoryFilePicker {
    /// Picker whose dialogs return the given files.
    pub fn returning(selection: Vec<MemoryFile>) -> Self {
        let picker = Self::default();
        picker.inner.borrow_mut().selection = selection;
        picker
    }

    /// Picker whose dialogs fail with the given host failure.
    pub fn failing(failure: HostFailure) -> Self {
        let picker = Self::default();
        picker.inner.borrow_mut().failure = Some(failure);
        picker
    }

    /// Replaces the scripted selection and clears any scripted failure.
    pub fn script_selection(&self, selection: Vec<MemoryFile>) {
        let mut data = self.inner.borrow_mut();
        data.selection = selection;
        data.failure = None;
    }

    /// Makes subsequent dialogs fail with the given host failure.
    pub fn script_failure(&self, failure: HostFailure) {
        self.inner.borrow_mut().failure = Some(failure);
    }

    /// Number of save-dialog invocations.
    pub fn create_calls(&self) -> u32 {
        self.inner.borrow().create_calls
    }

    /// Number of open-dialog invocations.
    pub fn open_calls(&self) -> u32 {
        self.inner.borrow().open_calls
    }

    /// Options passed to the most recent save dialog.
    pub fn last_create_options(&self) -> Option<CreateFileOptions> {
        self.inner.borrow().last_create_options.clone()
    }

    /// Options passed to the most recent open dialog.
    pub fn last_open_options(&self) -> Option<OpenFileOptions> {
        self.inner.borrow().last_open_options.clone()
    }
}

impl FilePickerService for MemoryFilePicker {
    fn pick_create_file<'a>(
        &'a self,
        options: &'a CreateFileOptions,
    ) -> HostFuture<'a, Result<Rc<dyn FileHandle>, HostFailure>> {
        Box::pin(async move {
            let mut data = self.inner.borrow_mut();
            data.create_calls += 1;
            data.last_create_options = Some(options.clone());
            if let Some(failure) = data.failure.clone() {
                return Err(failure);
            }
            let file = data
                .selection
                .first()
                .cloned()
                .ok_or_else(|| HostFailure::new("AbortError", "no scripted selection"))?;
            Ok(Rc::new(file) as Rc<dyn FileHandle>)
        })
    }

    fn pick_open_files<'a>(
        &'a self,
        options: &'a OpenFileOptions,
    ) -> HostFuture<'a, Result<Vec<Rc<dyn FileHandle>>, HostFailure>> {
        Box::pin(async move {
            let mut data = self.inner.borrow_mut();
            data.open_calls += 1;
            data.last_open_options = Some(options.clone());
            if let Some(failure) = data.failure.clone() {
                return Err(failure);
            }
            Ok(data
                .selection
                .iter()
                .cloned()
                .map(|file| Rc::new(file) as Rc<dyn FileHandle>)
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn writable_replaces_content_on_close() {
        let file = MemoryFile::new("notes.txt", "text/plain", "hello");
        let mut writable = block_on(file.create_writable()).expect("writable");
        block_on(writable.write_text("hello")).expect("write");
        block_on(writable.write_text(" world")).expect("write");
        assert_eq!(file.content(), "hello");

        block_on(writable.close()).expect("close");
        assert_eq!(file.content(), "hello world");
        assert_eq!(file.write_commits(), 1);
    }

    #[test]
    fn scripted_permissions_and_read_counts_are_observable() {
        let file = MemoryFile::new("a.txt", "text/plain", "abc")
            .with_permissions(PermissionState::Prompt, PermissionState::Denied);
        assert_eq!(
            block_on(file.query_permission(PermissionMode::Readwrite)),
            PermissionState::Prompt
        );
        assert_eq!(
            block_on(file.request_permission(PermissionMode::Readwrite)),
            PermissionState::Denied
        );
        assert_eq!(file.read_calls(), 0);

        let info = block_on(file.read_file()).expect("read");
        assert_eq!(info.size, 3);
        assert_eq!(file.read_calls(), 1);
    }

    #[test]
    fn picker_records_options_and_scripted_failures() {
        let picker = MemoryFilePicker::returning(vec![MemoryFile::new("a.txt", "", "")]);
        let handles =
            block_on(picker.pick_open_files(&OpenFileOptions::default())).expect("open");
        assert_eq!(handles.len(), 1);
        assert_eq!(picker.open_calls(), 1);
        assert!(picker.last_open_options().is_some());

        picker.script_failure(HostFailure::new("AbortError", "dismissed"));
        let err = block_on(picker.pick_open_files(&OpenFileOptions::default()))
            .expect_err("scripted failure");
        assert_eq!(err.name, "AbortError");
    }
}
