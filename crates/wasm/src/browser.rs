//! Browser implementations of the workspace ports

use js_sys::{Array, Function, Uint8Array};
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{console, Blob, BlobPropertyBag, HtmlAnchorElement, Url};
use workspace::{
    DownloadSink, Notification, NotificationLevel, Notifier, StoragePort, WorkspaceError,
};

/// Delay before a download's object URL is released
const REVOKE_DELAY_MS: i32 = 1_000;

/// Convert to plain JS objects and arrays rather than `Map`s
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

/// Readable message from a thrown JS value
pub fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn window() -> Result<web_sys::Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))
}

/// `window.localStorage` as a storage port
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    pub fn new() -> Result<Self, JsValue> {
        let inner = window()?
            .local_storage()?
            .ok_or_else(|| JsValue::from_str("localStorage is not available"))?;
        Ok(Self { inner })
    }
}

impl StoragePort for LocalStorage {
    fn get(&self, key: &str) -> workspace::Result<Option<String>> {
        self.inner
            .get_item(key)
            .map_err(|e| WorkspaceError::storage(key, js_message(&e)))
    }

    fn set(&self, key: &str, value: &str) -> workspace::Result<()> {
        self.inner
            .set_item(key, value)
            .map_err(|e| WorkspaceError::storage(key, js_message(&e)))
    }

    fn delete(&self, key: &str) -> workspace::Result<()> {
        self.inner
            .remove_item(key)
            .map_err(|e| WorkspaceError::storage(key, js_message(&e)))
    }
}

/// Triggers a file download through a temporary object URL
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownloads;

impl BrowserDownloads {
    fn trigger(&self, filename: &str, bytes: &[u8]) -> Result<(), JsValue> {
        let parts = Array::of1(&Uint8Array::from(bytes));
        let options = BlobPropertyBag::new();
        options.set_type("application/pdf");
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;

        let window = window()?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document available"))?;
        let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.click();

        // Revoking synchronously can cancel the download in some browsers
        let revoke = Closure::once_into_js(move || {
            if let Err(e) = Url::revoke_object_url(&url) {
                log::warn!("failed to revoke object URL: {}", js_message(&e));
            }
        });
        window.set_timeout_with_callback_and_timeout_and_arguments_0(
            revoke.unchecked_ref(),
            REVOKE_DELAY_MS,
        )?;
        Ok(())
    }
}

impl DownloadSink for BrowserDownloads {
    fn download(&self, filename: &str, bytes: &[u8]) -> workspace::Result<()> {
        self.trigger(filename, bytes)
            .map_err(|e| WorkspaceError::Download {
                filename: filename.to_string(),
                message: js_message(&e),
            })
    }
}

/// Forwards notifications to a JS callback, or to the console without one
#[derive(Default)]
pub struct JsNotifier {
    callback: Option<Function>,
}

impl JsNotifier {
    pub fn set_callback(&mut self, callback: Option<Function>) {
        self.callback = callback;
    }
}

fn level_name(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "success",
        NotificationLevel::Warning => "warning",
        NotificationLevel::Error => "error",
    }
}

/// Single console line for a notification
pub fn console_line(notification: &Notification) -> String {
    match &notification.action {
        Some(action) => format!(
            "{}: {} ({action})",
            notification.title, notification.message
        ),
        None => format!("{}: {}", notification.title, notification.message),
    }
}

fn to_console(notification: &Notification) {
    let line = JsValue::from_str(&console_line(notification));
    match notification.level {
        NotificationLevel::Error => console::error_1(&line),
        NotificationLevel::Warning => console::warn_1(&line),
        NotificationLevel::Info | NotificationLevel::Success => console::info_1(&line),
    }
}

impl Notifier for JsNotifier {
    fn notify(&self, notification: Notification) {
        let Some(callback) = &self.callback else {
            to_console(&notification);
            return;
        };

        let payload = json!({
            "level": level_name(notification.level),
            "title": notification.title,
            "message": notification.message,
            "action": notification.action,
        });
        let delivered = to_js(&payload).and_then(|value| callback.call1(&JsValue::NULL, &value));
        if let Err(e) = delivered {
            log::warn!("notification callback failed: {}", js_message(&e));
        }
    }
}
