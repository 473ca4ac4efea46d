//! Browser (`wasm32`) implementations of the [`file_session`] host contracts.
//!
//! This crate is the concrete browser-side wiring layer for the picker
//! dialogs, file handles, writable streams, the repeating timer, and the
//! task spawner. Transport glue is split by compile target under `interop/`,
//! so the crate builds and unit-tests on native targets, where every
//! operation reports that the browser file access APIs are unavailable.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod interop;
pub mod picker;
pub mod scheduler;

pub use picker::{WebFileHandle, WebFilePickerService, WebFileWritable};
pub use scheduler::{WebIntervalHandle, WebIntervalScheduler, WebTaskSpawner};

use std::rc::Rc;

use file_session::SessionServices;

/// Builds the browser-backed service bundle for a [`file_session::FileSession`].
pub fn build_session_services() -> SessionServices {
    SessionServices {
        picker: Rc::new(WebFilePickerService),
        scheduler: Rc::new(WebIntervalScheduler),
        spawner: Rc::new(WebTaskSpawner),
    }
}
