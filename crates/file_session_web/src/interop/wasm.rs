use std::time::Duration;

use file_session::{
    CreateFileOptions, FileInfo, HostFailure, LocalTask, OpenFileOptions, PermissionMode,
    PermissionState,
};
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::ser::Serialize;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, File, FileSystemFileHandle, FileSystemWritableFileStream, Window};

fn host_failure_from_js(err: JsValue) -> HostFailure {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        return HostFailure::new(exception.name(), exception.message());
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return HostFailure::new(String::from(error.name()), String::from(error.message()));
    }
    HostFailure::new(
        "UnknownError",
        err.as_string().unwrap_or_else(|| format!("{err:?}")),
    )
}

fn window() -> Result<Window, HostFailure> {
    web_sys::window().ok_or_else(|| HostFailure::new("UnknownError", "no window available"))
}

fn options_to_js(value: &serde_json::Value) -> Result<JsValue, HostFailure> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|err| HostFailure::new("TypeError", err.to_string()))
}

async fn call_picker(name: &str, options: JsValue) -> Result<JsValue, HostFailure> {
    let window = window()?;
    let picker = Reflect::get(window.as_ref(), &JsValue::from_str(name))
        .map_err(host_failure_from_js)?;
    let picker: Function = picker.dyn_into().map_err(|_| {
        HostFailure::new(
            "NotSupportedError",
            format!("{name} is not available in this browser"),
        )
    })?;
    let promise: Promise = picker
        .call1(window.as_ref(), &options)
        .map_err(host_failure_from_js)?
        .dyn_into()
        .map_err(|_| HostFailure::new("TypeError", format!("{name} did not return a promise")))?;
    JsFuture::from(promise).await.map_err(host_failure_from_js)
}

async fn permission_call(handle: &JsValue, method: &str, mode: PermissionMode) -> PermissionState {
    let Ok(member) = Reflect::get(handle, &JsValue::from_str(method)) else {
        return PermissionState::Denied;
    };
    let Ok(function) = member.dyn_into::<Function>() else {
        // Browsers without the permission API grant handle access implicitly.
        return PermissionState::Granted;
    };
    let descriptor = Object::new();
    if Reflect::set(
        descriptor.as_ref(),
        &JsValue::from_str("mode"),
        &JsValue::from_str(mode.as_str()),
    )
    .is_err()
    {
        return PermissionState::Denied;
    }
    let Ok(result) = function.call1(handle, descriptor.as_ref()) else {
        return PermissionState::Denied;
    };
    let Ok(promise) = result.dyn_into::<Promise>() else {
        return PermissionState::Denied;
    };
    match JsFuture::from(promise).await {
        Ok(state) => match state.as_string().as_deref() {
            Some("granted") => PermissionState::Granted,
            Some("prompt") => PermissionState::Prompt,
            _ => PermissionState::Denied,
        },
        Err(_) => PermissionState::Denied,
    }
}

pub(crate) struct PlatformFileHandle {
    raw: FileSystemFileHandle,
}

impl PlatformFileHandle {
    pub(crate) fn name(&self) -> String {
        self.raw.name()
    }

    pub(crate) async fn query_permission(&self, mode: PermissionMode) -> PermissionState {
        permission_call(self.raw.as_ref(), "queryPermission", mode).await
    }

    pub(crate) async fn request_permission(&self, mode: PermissionMode) -> PermissionState {
        permission_call(self.raw.as_ref(), "requestPermission", mode).await
    }

    pub(crate) async fn read_file(&self) -> Result<FileInfo, HostFailure> {
        let file: File = JsFuture::from(self.raw.get_file())
            .await
            .map_err(host_failure_from_js)?
            .into();
        let content = JsFuture::from(file.text())
            .await
            .map_err(host_failure_from_js)?
            .as_string()
            .unwrap_or_default();
        Ok(FileInfo {
            name: file.name(),
            size: file.size() as u64,
            mime_type: file.type_(),
            content,
        })
    }

    pub(crate) async fn create_writable(&self) -> Result<PlatformWritable, HostFailure> {
        let stream = JsFuture::from(self.raw.create_writable())
            .await
            .map_err(host_failure_from_js)?;
        Ok(PlatformWritable { raw: stream.into() })
    }
}

pub(crate) struct PlatformWritable {
    raw: FileSystemWritableFileStream,
}

impl PlatformWritable {
    pub(crate) async fn write_text(&mut self, text: &str) -> Result<(), HostFailure> {
        let promise = self.raw.write_with_str(text).map_err(host_failure_from_js)?;
        JsFuture::from(promise).await.map_err(host_failure_from_js)?;
        Ok(())
    }

    pub(crate) async fn close(&mut self) -> Result<(), HostFailure> {
        JsFuture::from(self.raw.close())
            .await
            .map_err(host_failure_from_js)?;
        Ok(())
    }
}

pub(crate) async fn pick_create_file(
    options: &CreateFileOptions,
) -> Result<PlatformFileHandle, HostFailure> {
    let value = options
        .to_picker_value()
        .map_err(|msg| HostFailure::new("TypeError", msg))?;
    let handle = call_picker("showSaveFilePicker", options_to_js(&value)?).await?;
    Ok(PlatformFileHandle { raw: handle.into() })
}

pub(crate) async fn pick_open_files(
    options: &OpenFileOptions,
) -> Result<Vec<PlatformFileHandle>, HostFailure> {
    let value = options
        .to_picker_value()
        .map_err(|msg| HostFailure::new("TypeError", msg))?;
    let handles = call_picker("showOpenFilePicker", options_to_js(&value)?).await?;
    let handles: Array = handles.unchecked_into();
    Ok(handles
        .iter()
        .map(|handle| PlatformFileHandle { raw: handle.into() })
        .collect())
}

pub(crate) struct PlatformIntervalHandle {
    id: Option<i32>,
    _tick: Closure<dyn FnMut()>,
}

impl PlatformIntervalHandle {
    pub(crate) fn cancel(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(id);
        }
    }
}

pub(crate) fn schedule_interval(
    interval: Duration,
    tick: Box<dyn FnMut()>,
) -> Result<PlatformIntervalHandle, String> {
    let window = web_sys::window().ok_or_else(|| "no window available".to_string())?;
    let tick = Closure::wrap(tick);
    let id = window
        .set_interval_with_callback_and_timeout_and_arguments_0(
            tick.as_ref().unchecked_ref(),
            interval.as_millis() as i32,
        )
        .map_err(|err| format!("setInterval failed: {err:?}"))?;
    Ok(PlatformIntervalHandle {
        id: Some(id),
        _tick: tick,
    })
}

pub(crate) fn spawn_task(task: LocalTask) {
    wasm_bindgen_futures::spawn_local(task);
}
