//! evaltrace as a WASM module for browser environments.
//!
//! A browser-side renderer pulls traces as JSON and animates them.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { trace, function_source } from 'evaltrace-wasm';
//!
//! await init();
//!
//! const result = JSON.parse(trace("factorial", 3));
//! // { success: true, trace: { scenario: "factorial", steps: [...], result: 6 }, error: null }
//! ```

use evaltrace_eval::Scenario;
use wasm_bindgen::prelude::*;

/// Trace a scenario applied to `argument`.
///
/// Returns a JSON string containing a `TraceOutcome`:
/// ```json
/// { "success": true, "trace": { "steps": [ ... ], "result": 16, ... }, "error": null }
/// ```
///
/// On failure, `success` is `false`, `trace` is `null`, and `error` holds
/// the message.
#[wasm_bindgen]
pub fn trace(scenario: &str, argument: i32) -> String {
    let outcome = evaltrace_eval::trace_to_outcome(scenario, i64::from(argument));
    serde_json::to_string(&outcome).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"trace":null,"error":"Serialization error: {}"}}"#,
            e
        )
    })
}

/// Return the OCaml source of the function a scenario calls, or an empty
/// string for an unknown scenario.
#[wasm_bindgen]
pub fn function_source(scenario: &str) -> String {
    scenario
        .parse::<Scenario>()
        .and_then(Scenario::function)
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Return the module version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
