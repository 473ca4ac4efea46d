//! Shared transport interop for the browser file-access adapter.
//!
//! This module routes calls to target-specific implementations while
//! preserving a uniform API for the adapter types.

use std::time::Duration;

use file_session::{CreateFileOptions, HostFailure, LocalTask, OpenFileOptions};

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub(crate) use imp::{PlatformFileHandle, PlatformIntervalHandle, PlatformWritable};

pub(crate) async fn pick_create_file(
    options: &CreateFileOptions,
) -> Result<PlatformFileHandle, HostFailure> {
    imp::pick_create_file(options).await
}

pub(crate) async fn pick_open_files(
    options: &OpenFileOptions,
) -> Result<Vec<PlatformFileHandle>, HostFailure> {
    imp::pick_open_files(options).await
}

pub(crate) fn schedule_interval(
    interval: Duration,
    tick: Box<dyn FnMut()>,
) -> Result<PlatformIntervalHandle, String> {
    imp::schedule_interval(interval, tick)
}

pub(crate) fn spawn_task(task: LocalTask) {
    imp::spawn_task(task);
}
