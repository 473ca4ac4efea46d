//! Host file-access contracts and in-memory doubles.

pub mod memory;
pub mod service;

pub use memory::{MemoryFile, MemoryFilePicker};
pub use service::{
    FileHandle, FilePickerService, FileWritable, HostFailure, HostFuture, NoopFilePicker,
};
