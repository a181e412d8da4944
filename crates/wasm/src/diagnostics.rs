//! Browser console diagnostics.

use gqlbind_reactive::{Diagnostics, Report};
use wasm_bindgen::prelude::*;

/// Writes client errors with `console.error` and everything else with
/// `console.warn`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleDiagnostics;

impl Diagnostics for ConsoleDiagnostics {
    fn report(&self, report: Report) {
        let message = JsValue::from_str(&report.to_string());
        if report.is_client_error() {
            web_sys::console::error_1(&message);
        } else {
            web_sys::console::warn_1(&message);
        }
    }
}
