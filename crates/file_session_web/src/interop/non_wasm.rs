use std::time::Duration;

use file_session::{
    CreateFileOptions, FileInfo, HostFailure, LocalTask, OpenFileOptions, PermissionMode,
    PermissionState,
};

fn unsupported() -> HostFailure {
    HostFailure::new(
        "NotSupportedError",
        "browser file access APIs are only available when compiled for wasm32",
    )
}

#[derive(Debug, Clone)]
pub(crate) struct PlatformFileHandle;

impl PlatformFileHandle {
    pub(crate) fn name(&self) -> String {
        String::new()
    }

    pub(crate) async fn query_permission(&self, _mode: PermissionMode) -> PermissionState {
        PermissionState::Denied
    }

    pub(crate) async fn request_permission(&self, _mode: PermissionMode) -> PermissionState {
        PermissionState::Denied
    }

    pub(crate) async fn read_file(&self) -> Result<FileInfo, HostFailure> {
        Err(unsupported())
    }

    pub(crate) async fn create_writable(&self) -> Result<PlatformWritable, HostFailure> {
        Err(unsupported())
    }
}

pub(crate) struct PlatformWritable;

impl PlatformWritable {
    pub(crate) async fn write_text(&mut self, _text: &str) -> Result<(), HostFailure> {
        Err(unsupported())
    }

    pub(crate) async fn close(&mut self) -> Result<(), HostFailure> {
        Err(unsupported())
    }
}

pub(crate) struct PlatformIntervalHandle;

impl PlatformIntervalHandle {
    pub(crate) fn cancel(&mut self) {}
}

pub(crate) async fn pick_create_file(
    _options: &CreateFileOptions,
) -> Result<PlatformFileHandle, HostFailure> {
    Err(unsupported())
}

pub(crate) async fn pick_open_files(
    _options: &OpenFileOptions,
) -> Result<Vec<PlatformFileHandle>, HostFailure> {
    Err(unsupported())
}

pub(crate) fn schedule_interval(
    _interval: Duration,
    _tick: Box<dyn FnMut()>,
) -> Result<PlatformIntervalHandle, String> {
    Err("interval timers are only available when compiled for wasm32".to_string())
}

pub(crate) fn spawn_task(_task: LocalTask) {}
