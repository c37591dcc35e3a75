//! Reserved action types
//!
//! These are private to the store. For any unknown action, a reducer must
//! return the current state, or the initial state if the current state is
//! absent. Reducers must not handle these types directly.

use std::sync::OnceLock;

const NAMESPACE: &str = "@@redux/";

fn random_string() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id.chars()
        .take(7)
        .map(String::from)
        .collect::<Vec<_>>()
        .join(".")
}

/// Dispatched once when a store is created and when probing slice reducers
pub fn init() -> &'static str {
    static INIT: OnceLock<String> = OnceLock::new();
    INIT.get_or_init(|| format!("{NAMESPACE}INIT{}", random_string()))
}

/// Dispatched by `replace_reducer`
pub fn replace() -> &'static str {
    static REPLACE: OnceLock<String> = OnceLock::new();
    REPLACE.get_or_init(|| format!("{NAMESPACE}REPLACE{}", random_string()))
}

/// A fresh, never-before-seen action type on every call
pub fn probe_unknown_action() -> String {
    format!("{NAMESPACE}PROBE_UNKNOWN_ACTION{}", random_string())
}

/// Whether `action_type` belongs to the reserved namespace
pub fn is_reserved(action_type: &str) -> bool {
    action_type.starts_with(NAMESPACE)
}
