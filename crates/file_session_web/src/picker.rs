//! Browser picker and handle adapters over the shared interop.

use std::rc::Rc;

use file_session::{
    CreateFileOptions, FileHandle, FileInfo, FilePickerService, FileWritable, HostFailure,
    HostFuture, OpenFileOptions, PermissionMode, PermissionState,
};

use crate::interop;

#[derive(Debug, Clone, Copy, Default)]
/// Browser picker service backed by the native file dialogs.
pub struct WebFilePickerService;

impl FilePickerService for WebFilePickerService {
    fn pick_create_file<'a>(
        &'a self,
        options: &'a CreateFileOptions,
    ) -> HostFuture<'a, Result<Rc<dyn FileHandle>, HostFailure>> {
        Box::pin(async move {
            let handle = interop::pick_create_file(options).await?;
            Ok(Rc::new(WebFileHandle { raw: handle }) as Rc<dyn FileHandle>)
        })
    }

    fn pick_open_files<'a>(
        &'a self,
        options: &'a OpenFileOptions,
    ) -> HostFuture<'a, Result<Vec<Rc<dyn FileHandle>>, HostFailure>> {
        Box::pin(async move {
            let handles = interop::pick_open_files(options).await?;
            Ok(handles
                .into_iter()
                .map(|raw| Rc::new(WebFileHandle { raw }) as Rc<dyn FileHandle>)
                .collect())
        })
    }
}

/// Browser file handle wrapping the native capability object.
pub struct WebFileHandle {
    raw: interop::PlatformFileHandle,
}

impl FileHandle for WebFileHandle {
    fn name(&self) -> String {
        self.raw.name()
    }

    fn query_permission<'a>(&'a self, mode: PermissionMode) -> HostFuture<'a, PermissionState> {
        Box::pin(async move { self.raw.query_permission(mode).await })
    }

    fn request_permission<'a>(&'a self, mode: PermissionMode) -> HostFuture<'a, PermissionState> {
        Box::pin(async move { self.raw.request_permission(mode).await })
    }

    fn read_file<'a>(&'a self) -> HostFuture<'a, Result<FileInfo, HostFailure>> {
        Box::pin(async move { self.raw.read_file().await })
    }

    fn create_writable<'a>(
        &'a self,
    ) -> HostFuture<'a, Result<Box<dyn FileWritable>, HostFailure>> {
        Box::pin(async move {
            let writable = self.raw.create_writable().await?;
            Ok(Box::new(WebFileWritable { raw: writable }) as Box<dyn FileWritable>)
        })
    }
}

/// Browser writable stream committing content when closed.
pub struct WebFileWritable {
    raw: interop::PlatformWritable,
}

impl FileWritable for WebFileWritable {
    fn write_text<'a>(&'a mut self, text: &'a str) -> HostFuture<'a, Result<(), HostFailure>> {
        Box::pin(async move { self.raw.write_text(text).await })
    }

    fn close<'a>(&'a mut self) -> HostFuture<'a, Result<(), HostFailure>> {
        Box::pin(async move { self.raw.close().await })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn native_targets_report_unsupported_pickers() {
        let picker = WebFilePickerService;
        let picker_obj: &dyn FilePickerService = &picker;

        let err = block_on(picker_obj.pick_open_files(&OpenFileOptions::default()))
            .expect_err("open should fail");
        assert_eq!(err.name, "NotSupportedError");
        assert_eq!(
            err.message,
            "browser file access APIs are only available when compiled for wasm32"
        );

        let err = block_on(picker_obj.pick_create_file(&CreateFileOptions::default()))
            .expect_err("create should fail");
        assert_eq!(err.name, "NotSupportedError");
    }
}
