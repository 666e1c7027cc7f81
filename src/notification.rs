use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::config::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }

    fn background(&self) -> &'static str {
        match self {
            NotificationKind::Success => "#16a34a",
            NotificationKind::Error => "#dc2626",
            NotificationKind::Info => "#2563eb",
        }
    }
}

/// Show a toast in the top-right corner; it removes itself after the configured delay.
pub fn notify(kind: NotificationKind, message: &str) {
    match kind {
        NotificationKind::Error => error!("{}", message),
        _ => info!("{}", message),
    }
    if let Err(e) = show_toast(kind, message) {
        warn!("toast not shown: {:?}", e);
    }
}

pub fn success(message: &str) {
    notify(NotificationKind::Success, message);
}

pub fn error(message: &str) {
    notify(NotificationKind::Error, message);
}

pub fn info(message: &str) {
    notify(NotificationKind::Info, message);
}

fn show_toast(kind: NotificationKind, message: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let body = document.body().ok_or("no body")?;

    let toast = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    toast.set_class_name(&format!("notification notification-{}", kind.as_str()));
    toast.set_inner_text(message);
    let style = toast.style();
    for (key, value) in [
        ("position", "fixed"),
        ("top", "20px"),
        ("right", "20px"),
        ("z-index", "9999"),
        ("padding", "12px 20px"),
        ("border-radius", "6px"),
        ("color", "#ffffff"),
        ("background", kind.background()),
        ("box-shadow", "0 4px 12px rgba(0,0,0,0.15)"),
    ] {
        style.set_property(key, value)?;
    }
    body.append_child(&toast)?;

    let closure = Closure::once(move || toast.remove());
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        config().notification_duration_ms,
    )?;
    closure.forget();
    Ok(())
}
