//! Typed host contracts and the session state machine for live single-file
//! editing over the platform's native file-picker/handle APIs.
//!
//! This crate is the API-first boundary: the host-service traits, the shared
//! data model, and `Noop*`/`Memory*`/`Manual*` adapters live here together
//! with the [`FileSession`] state machine and its [`Autosave`] component,
//! while the concrete browser adapters live in `file_session_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod autosave;
pub mod error;
pub mod host;
pub mod observer;
pub mod session;
pub mod state;
pub mod time;
pub mod types;

pub use autosave::{
    Autosave, AutosaveSetup, AutosaveSetupBuilder, BlockingTaskSpawner, IntervalHandle,
    IntervalScheduler, LocalTask, ManualIntervalHandle, ManualIntervalScheduler,
    NoopIntervalScheduler, NoopTaskSpawner, TaskSpawner, DEFAULT_AUTOSAVE_INTERVAL,
};
pub use error::{SessionError, SessionErrorKind};
pub use host::{
    FileHandle, FilePickerService, FileWritable, HostFailure, HostFuture, MemoryFile,
    MemoryFilePicker, NoopFilePicker,
};
pub use observer::{
    AutosaveRunningChangeEvent, CloseFileEvent, CreateFileEvent, OpenFileEvent, SaveFileEvent,
    SessionObserver, StateChangeEvent, Subscription,
};
pub use session::{FileSession, SessionServices, SessionSetup};
pub use state::SessionState;
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};
pub use types::{
    CreateFileOptions, FileInfo, FileTypeFilter, OpenFileOptions, PermissionMode, PermissionState,
    PickerOptions, SaveReceipt, WellKnownDirectory, PICKER_ID_MAX_LEN,
};
