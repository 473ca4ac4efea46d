//! The single-file session state machine over the host contracts.

use std::{cell::RefCell, rc::Rc};

use crate::autosave::{Autosave, IntervalScheduler, TaskSpawner};
use crate::error::{SessionError, SessionErrorKind};
use crate::host::{FileHandle, FilePickerService};
use crate::observer::{
    AutosaveRunningChangeEvent, CloseFileEvent, CreateFileEvent, OpenFileEvent, SaveFileEvent,
    SessionObserver, StateChangeEvent,
};
use crate::state::SessionState;
use crate::time;
use crate::types::{
    CreateFileOptions, FileInfo, FileTypeFilter, OpenFileOptions, PermissionMode, PermissionState,
    PickerOptions, SaveReceipt,
};

#[derive(Clone)]
/// Host services a session is constructed from.
pub struct SessionServices {
    /// Native picker dialog service.
    pub picker: Rc<dyn FilePickerService>,
    /// Repeating-timer primitive used by autosave.
    pub scheduler: Rc<dyn IntervalScheduler>,
    /// Executor for fire-and-forget autosave ticks.
    pub spawner: Rc<dyn TaskSpawner>,
}

#[derive(Debug, Clone, Default)]
/// Session-level defaults applied when building picker options.
pub struct SessionSetup {
    /// File types offered by both pickers; empty allows every type.
    pub allowed_file_types: Vec<FileTypeFilter>,
    /// Re-opens picker dialogs in the last used directory when set.
    pub remember_last_directory: bool,
}

pub(crate) struct SessionInner {
    pub(crate) services: SessionServices,
    setup: RefCell<SessionSetup>,
    picker_id: String,
    handle: RefCell<Option<Rc<dyn FileHandle>>>,
    state: RefCell<SessionState>,
    observer: SessionObserver,
    autosave: Autosave,
}

#[derive(Clone)]
/// Cheaply cloneable handle to one live file session.
///
/// A session holds at most one current file reference. All operations are
/// async, return typed results, and never panic to the caller; failure paths
/// leave the previous reference and state in place.
pub struct FileSession {
    inner: Rc<SessionInner>,
}

impl FileSession {
    /// Creates a session over the given host services.
    pub fn new(services: SessionServices) -> Self {
        let inner = Rc::new(SessionInner {
            services,
            setup: RefCell::new(SessionSetup::default()),
            picker_id: session_picker_id(),
            handle: RefCell::new(None),
            state: RefCell::new(SessionState::default()),
            observer: SessionObserver::default(),
            autosave: Autosave::new(),
        });
        inner.autosave.bind(Rc::downgrade(&inner));
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<SessionInner>) -> Self {
        Self { inner }
    }

    /// Replaces the session-level defaults.
    pub fn set_setup(&self, setup: SessionSetup) {
        *self.inner.setup.borrow_mut() = setup;
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Returns true when a file reference is currently held.
    pub fn has_open_file(&self) -> bool {
        self.inner.handle.borrow().is_some()
    }

    /// The autosave component of this session.
    pub fn autosave(&self) -> Autosave {
        self.inner.autosave.clone()
    }

    /// The observer notifying this session's listeners.
    pub fn observer(&self) -> SessionObserver {
        self.inner.observer.clone()
    }

    /// Open-dialog options built from the session setup.
    pub fn default_open_options(&self) -> OpenFileOptions {
        OpenFileOptions {
            picker: self.default_picker_options(),
            multiple: false,
        }
    }

    /// Save-dialog options built from the session setup.
    pub fn default_create_options(&self) -> CreateFileOptions {
        CreateFileOptions {
            picker: self.default_picker_options(),
            suggested_name: None,
        }
    }

    /// Opens the save-file picker with the session's default options.
    pub async fn create_file(&self) -> Result<FileInfo, SessionError> {
        self.create_file_with(self.default_create_options()).await
    }

    /// Opens the save-file picker with a pre-filled file name.
    pub async fn create_file_named(&self, suggested_name: &str) -> Result<FileInfo, SessionError> {
        let mut options = self.default_create_options();
        options.suggested_name = Some(suggested_name.to_string());
        self.create_file_with(options).await
    }

    /// Opens the save-file picker and makes the chosen file current.
    ///
    /// On success the new handle replaces any prior reference and the file's
    /// metadata and content are read back. On failure (including the user
    /// dismissing the dialog) the prior reference is left untouched.
    pub async fn create_file_with(
        &self,
        mut options: CreateFileOptions,
    ) -> Result<FileInfo, SessionError> {
        self.prepare_picker_options(&mut options.picker);
        let result = self.run_create(&options).await;
        self.inner.observer.notify_create_file(&CreateFileEvent {
            result: result.clone(),
        });
        if result.is_ok() {
            self.start_autosave_if_enabled();
        }
        result
    }

    /// Opens the open-file picker with the session's default options.
    pub async fn open_file(&self) -> Result<FileInfo, SessionError> {
        self.open_file_with(self.default_open_options()).await
    }

    /// Opens the open-file picker and makes the first selected file current.
    ///
    /// The handle is stored before the read-write permission check runs, so
    /// a declined prompt reports [`SessionErrorKind::PermissionNotGranted`]
    /// while the reference stays current; the file is only read after a
    /// grant.
    pub async fn open_file_with(
        &self,
        mut options: OpenFileOptions,
    ) -> Result<FileInfo, SessionError> {
        self.prepare_picker_options(&mut options.picker);
        let result = self.run_open(&options).await;
        self.inner.observer.notify_open_file(&OpenFileEvent {
            result: result.clone(),
        });
        if result.is_ok() {
            self.start_autosave_if_enabled();
        }
        result
    }

    /// Writes `content` to the current file, replacing its stored content.
    pub async fn save_file(&self, content: &str) -> Result<SaveReceipt, SessionError> {
        let result = self.run_save(content).await;
        self.inner.observer.notify_save_file(&SaveFileEvent {
            content: content.to_string(),
            error: result.as_ref().err().cloned(),
        });
        result
    }

    /// Clears the current file reference.
    ///
    /// Stops a running autosave process, re-reads the file's final metadata
    /// and content, and returns them. When the final read fails the error is
    /// returned and the reference stays held.
    pub async fn close_file(&self) -> Result<FileInfo, SessionError> {
        let result = self.run_close().await;
        self.inner.observer.notify_close_file(&CloseFileEvent {
            result: result.clone(),
        });
        result
    }

    async fn run_create(&self, options: &CreateFileOptions) -> Result<FileInfo, SessionError> {
        options
            .picker
            .validate()
            .map_err(|msg| SessionError::new(SessionErrorKind::InvalidFileTypes, msg))?;
        let handle = self
            .inner
            .services
            .picker
            .pick_create_file(options)
            .await
            .map_err(SessionError::from)?;
        *self.inner.handle.borrow_mut() = Some(Rc::clone(&handle));
        let info = handle.read_file().await.map_err(SessionError::from)?;
        self.set_opened_file(info.clone());
        Ok(info)
    }

    async fn run_open(&self, options: &OpenFileOptions) -> Result<FileInfo, SessionError> {
        options
            .picker
            .validate()
            .map_err(|msg| SessionError::new(SessionErrorKind::InvalidFileTypes, msg))?;
        let handles = self
            .inner
            .services
            .picker
            .pick_open_files(options)
            .await
            .map_err(SessionError::from)?;
        let Some(handle) = handles.into_iter().next() else {
            return Err(SessionError::new(
                SessionErrorKind::Unknown,
                "file picker returned no selection",
            ));
        };
        *self.inner.handle.borrow_mut() = Some(Rc::clone(&handle));
        if !ensure_permission(handle.as_ref(), PermissionMode::Readwrite).await {
            return Err(SessionError::new(
                SessionErrorKind::PermissionNotGranted,
                "User did not grant permission",
            ));
        }
        let info = handle.read_file().await.map_err(SessionError::from)?;
        self.set_opened_file(info.clone());
        Ok(info)
    }

    async fn run_save(&self, content: &str) -> Result<SaveReceipt, SessionError> {
        let handle = self.current_handle().ok_or_else(|| {
            SessionError::new(
                SessionErrorKind::MissingFile,
                "It's not possible to save because no file was open before",
            )
        })?;
        let mut writable = handle.create_writable().await.map_err(SessionError::from)?;
        writable
            .write_text(content)
            .await
            .map_err(SessionError::from)?;
        writable.close().await.map_err(SessionError::from)?;

        let saved_at = time::next_monotonic_timestamp_ms();
        self.apply_state(self.state().with_last_save(saved_at, content.to_string()));
        Ok(SaveReceipt {
            content: content.to_string(),
            saved_at_unix_ms: saved_at,
        })
    }

    async fn run_close(&self) -> Result<FileInfo, SessionError> {
        let handle = self.current_handle().ok_or_else(|| {
            SessionError::new(SessionErrorKind::MissingFile, "There is no file to close")
        })?;
        if self.inner.autosave.is_running() {
            self.inner.autosave.stop();
        }
        let info = handle.read_file().await.map_err(SessionError::from)?;
        *self.inner.handle.borrow_mut() = None;
        self.apply_state(self.state().with_opened_file(None));
        Ok(info)
    }

    pub(crate) async fn run_autosave_tick(&self) {
        let autosave = self.inner.autosave.clone();
        let Some(setup) = autosave.current_setup() else {
            return;
        };
        let content = setup.read_content();
        if autosave.matches_last_autosaved(&content) {
            return;
        }
        match self.save_file(&content).await {
            Ok(receipt) => {
                autosave.record_autosaved(receipt.content.clone());
                self.inner.observer.notify_autosave_file(&SaveFileEvent {
                    content: receipt.content,
                    error: None,
                });
            }
            Err(error) => {
                self.inner.observer.notify_autosave_file(&SaveFileEvent {
                    content,
                    error: Some(error),
                });
            }
        }
    }

    pub(crate) fn set_autosave_running(&self, running: bool) {
        self.apply_state(self.state().with_autosave_running(running));
        self.inner
            .observer
            .notify_autosave_running(&AutosaveRunningChangeEvent { running });
    }

    fn current_handle(&self) -> Option<Rc<dyn FileHandle>> {
        self.inner.handle.borrow().as_ref().map(Rc::clone)
    }

    fn set_opened_file(&self, info: FileInfo) {
        self.apply_state(self.state().with_opened_file(Some(info)));
    }

    fn apply_state(&self, next: SessionState) {
        let previous = {
            let mut state = self.inner.state.borrow_mut();
            if *state == next {
                return;
            }
            let previous = state.clone();
            *state = next.clone();
            previous
        };
        self.inner.observer.notify_state_change(&StateChangeEvent {
            current: next,
            previous,
        });
    }

    fn start_autosave_if_enabled(&self) {
        if self.inner.autosave.is_enabled() {
            let _ = self.inner.autosave.start();
        }
    }

    fn default_picker_options(&self) -> PickerOptions {
        let setup = self.inner.setup.borrow();
        PickerOptions {
            exclude_accept_all: !setup.allowed_file_types.is_empty(),
            start_in: None,
            id: None,
            types: setup.allowed_file_types.clone(),
        }
    }

    fn prepare_picker_options(&self, options: &mut PickerOptions) {
        if self.inner.setup.borrow().remember_last_directory {
            options.id = Some(self.inner.picker_id.clone());
        }
    }
}

async fn ensure_permission(handle: &dyn FileHandle, mode: PermissionMode) -> bool {
    if handle.query_permission(mode).await == PermissionState::Granted {
        return true;
    }
    handle.request_permission(mode).await == PermissionState::Granted
}

fn session_picker_id() -> String {
    format!("file-session-{:x}", time::next_monotonic_timestamp_ms())
}
