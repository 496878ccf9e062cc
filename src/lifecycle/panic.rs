//! Process-level fault reporting.
//!
//! Requests run in their own tasks, so a panic unwinds only that task.
//! The hook routes every panic message through tracing; the handler
//! answers the affected request with a 500 instead of dropping it.

use axum::response::{IntoResponse, Response};
use std::any::Any;

use crate::http::response::ApiError;

/// Log every panic through tracing instead of stderr.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());

        tracing::error!(
            location = %location,
            message = %panic_message(info.payload()),
            "Unexpected panic, process keeps serving"
        );
    }));
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// `CatchPanicLayer` handler.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!(message = %panic_message(payload.as_ref()), "Request handler panicked");
    ApiError::Internal.into_response()
}
