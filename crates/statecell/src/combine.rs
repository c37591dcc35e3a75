//! Reducer composition over a keyed state object
//!
//! `combine_reducers` turns a set of slice reducers, each owning one key of
//! the state, into a single reducer over `CombinedState`. A slice that did
//! not change keeps its `Rc`, and when no slice changed the previous
//! `CombinedState` itself is returned, so callers can detect "nothing
//! happened" with `Rc::ptr_eq`.

use crate::action::Action;
use crate::action_types;
use crate::error::{Result, StoreError};
use crate::reducer::Reducer;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// State produced by a combined reducer: one type-erased slice per key
#[derive(Clone, Default)]
pub struct CombinedState {
    slices: BTreeMap<String, Rc<dyn Any>>,
}

impl CombinedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slice, e.g. when building preloaded state
    pub fn with<T: 'static>(self, key: impl Into<String>, value: T) -> Self {
        self.with_rc(key, Rc::new(value))
    }

    pub fn with_rc<T: 'static>(mut self, key: impl Into<String>, value: Rc<T>) -> Self {
        self.slices.insert(key.into(), value);
        self
    }

    /// Typed access to a slice. `None` if the key is missing or holds another type.
    pub fn get<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
        self.slices.get(key).cloned()?.downcast::<T>().ok()
    }

    pub fn slice(&self, key: &str) -> Option<&Rc<dyn Any>> {
        self.slices.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slices.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl fmt::Debug for CombinedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedState")
            .field("keys", &self.slices.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The slice reducers to combine, keyed by the state key each one owns
///
/// A key may be declared without a reducer (`maybe_slice` with `None`); such
/// keys are left out of the combined reducer with a warning.
#[derive(Default)]
pub struct ReducersMap {
    entries: Vec<(String, Option<Reducer<dyn Any>>)>,
}

impl ReducersMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slice<T: 'static>(self, key: impl Into<String>, reducer: Reducer<T>) -> Self {
        self.maybe_slice(key, Some(reducer))
    }

    pub fn maybe_slice<T: 'static>(
        mut self,
        key: impl Into<String>,
        reducer: Option<Reducer<T>>,
    ) -> Self {
        let key = key.into();
        let reducer = reducer.map(|reducer| erase(key.clone(), reducer));

        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = reducer,
            None => self.entries.push((key, reducer)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hide a slice reducer's state type behind `dyn Any`, keeping `Rc` identity
fn erase<T: 'static>(key: String, reducer: Reducer<T>) -> Reducer<dyn Any> {
    Reducer::new(move |state: Option<Rc<dyn Any>>, action: &Action| {
        let state = match state {
            Some(state) => Some(state.downcast::<T>().map_err(|_| {
                StoreError::StateSliceMismatch { key: key.clone() }
            })?),
            None => None,
        };
        Ok(reducer
            .reduce(state, action)?
            .map(|next| next as Rc<dyn Any>))
    })
}

fn diagnostics_enabled() -> bool {
    cfg!(debug_assertions)
}

/// Combine slice reducers into one reducer over `CombinedState`
///
/// Each slice reducer is probed once, here, with the init action and with a
/// random unknown action; it must produce a state for both. A failed probe
/// does not fail this call. The error is returned by every call of the
/// combined reducer instead.
pub fn combine_reducers(reducers: ReducersMap) -> Reducer<CombinedState> {
    let mut final_reducers: Vec<(String, Reducer<dyn Any>)> = Vec::new();
    for (key, reducer) in reducers.entries {
        match reducer {
            Some(reducer) => final_reducers.push((key, reducer)),
            None => {
                if diagnostics_enabled() {
                    log::warn!("No reducer provided for key \"{}\"", key);
                }
            }
        }
    }

    let final_keys: Vec<String> = final_reducers.iter().map(|(key, _)| key.clone()).collect();
    let shape_error = assert_reducer_shape(&final_reducers).err();
    let unexpected_key_cache = RefCell::new(HashSet::new());

    Reducer::new(move |state: Option<Rc<CombinedState>>, action: &Action| {
        if let Some(err) = &shape_error {
            return Err(err.clone());
        }

        let state = state.unwrap_or_default();

        if diagnostics_enabled() {
            let warning = unexpected_state_shape_warning(
                &state,
                &final_keys,
                action,
                &mut unexpected_key_cache.borrow_mut(),
            );
            if let Some(message) = warning {
                log::warn!("{}", message);
            }
        }

        let mut has_changed = false;
        let mut next_state = CombinedState::new();
        for (key, reducer) in &final_reducers {
            let previous = state.slice(key).cloned();
            let next = reducer
                .reduce(previous.clone(), action)?
                .ok_or_else(|| slice_returned_absent(key, action))?;

            has_changed =
                has_changed || previous.is_none_or(|previous| !Rc::ptr_eq(&previous, &next));
            next_state.slices.insert(key.clone(), next);
        }
        has_changed = has_changed || final_reducers.len() != state.len();

        Ok(Some(if has_changed { Rc::new(next_state) } else { state }))
    })
}

fn slice_returned_absent(key: &str, action: &Action) -> StoreError {
    StoreError::ReducerReturnedUndefined(format!(
        "When called with an action of type \"{}\", \
         the slice reducer for key \"{}\" returned no state. \
         To ignore an action, you must explicitly return the previous state.",
        action.action_type(),
        key
    ))
}

fn assert_reducer_shape(reducers: &[(String, Reducer<dyn Any>)]) -> Result<()> {
    for (key, reducer) in reducers {
        let init = Action::new(action_types::init());
        if reducer.reduce(None, &init)?.is_none() {
            return Err(StoreError::ReducerReturnedUndefined(format!(
                "The slice reducer for key \"{}\" returned no state during initialization. \
                 If the state passed to the reducer is absent, \
                 you must explicitly return the initial state.",
                key
            )));
        }

        let probe = Action::new(action_types::probe_unknown_action());
        if reducer.reduce(None, &probe)?.is_none() {
            return Err(StoreError::ReducerReturnedUndefined(format!(
                "The slice reducer for key \"{}\" returned no state \
                 when probed with a random type. \
                 Don't try to handle '{}' or other actions in the \"@@redux/*\" namespace. \
                 They are considered private. \
                 Instead, you must return the current state for any unknown actions, \
                 unless it is absent, \
                 in which case you must return the initial state, regardless of the action type.",
                key,
                action_types::init()
            )));
        }
    }
    Ok(())
}

/// Describe problems with the incoming state's keys, if any
///
/// Each unexpected key is reported once; the cache remembers what was
/// already reported. Nothing is reported for the replace action, since
/// swapping reducers legitimately changes the set of keys.
fn unexpected_state_shape_warning(
    state: &CombinedState,
    reducer_keys: &[String],
    action: &Action,
    cache: &mut HashSet<String>,
) -> Option<String> {
    if reducer_keys.is_empty() {
        return Some(
            "Store does not have a valid reducer. Make sure the map passed to combine_reducers \
             contains at least one reducer."
                .to_string(),
        );
    }

    let argument_name = if action.is(action_types::init()) {
        "preloaded state passed to create_store"
    } else {
        "previous state received by the reducer"
    };

    let unexpected: Vec<&str> = state
        .keys()
        .filter(|key| {
            !reducer_keys.iter().any(|known| known.as_str() == *key) && !cache.contains(*key)
        })
        .collect();
    for key in &unexpected {
        cache.insert(key.to_string());
    }

    if action.is(action_types::replace()) || unexpected.is_empty() {
        return None;
    }

    Some(format!(
        "Unexpected {} \"{}\" found in {}. \
         Expected to find one of the known reducer keys instead: \"{}\". \
         Unexpected keys will be ignored.",
        if unexpected.len() > 1 { "keys" } else { "key" },
        unexpected.join("\", \""),
        argument_name,
        reducer_keys.join("\", \"")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> Reducer<i32> {
        Reducer::with_default(0, |state, action| match action.action_type() {
            "INC" => Rc::new(**state + 1),
            _ => state.clone(),
        })
    }

    fn todos() -> Reducer<Vec<String>> {
        Reducer::with_default(Vec::new(), |state, action| match action.action_type() {
            "ADD_TODO" => {
                let mut next = (**state).clone();
                if let Some(text) = action.get("text").and_then(|v| v.as_str()) {
                    next.push(text.to_string());
                }
                Rc::new(next)
            }
            _ => state.clone(),
        })
    }

    fn init_action() -> Action {
        Action::new(action_types::init())
    }

    #[test]
    fn test_combined_initial_state() {
        let reducer = combine_reducers(
            ReducersMap::new()
                .slice("counter", counter())
                .slice("todos", todos()),
        );
        let state = reducer.reduce(None, &init_action()).unwrap().unwrap();

        assert_eq!(*state.get::<i32>("counter").unwrap(), 0);
        assert!(state.get::<Vec<String>>("todos").unwrap().is_empty());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_unchanged_slices_keep_identity() {
        let reducer = combine_reducers(
            ReducersMap::new()
                .slice("counter", counter())
                .slice("todos", todos()),
        );
        let before = reducer.reduce(None, &init_action()).unwrap().unwrap();
        let after = reducer
            .reduce(Some(before.clone()), &Action::new("INC"))
            .unwrap()
            .unwrap();

        assert!(!Rc::ptr_eq(&before, &after));
        assert!(Rc::ptr_eq(before.slice("todos").unwrap(), after.slice("todos").unwrap()));
        assert!(!Rc::ptr_eq(before.slice("counter").unwrap(), after.slice("counter").unwrap()));
        assert_eq!(*after.get::<i32>("counter").unwrap(), 1);
    }

    #[test]
    fn test_no_change_returns_same_state() {
        let reducer = combine_reducers(ReducersMap::new().slice("counter", counter()));
        let before = reducer.reduce(None, &init_action()).unwrap().unwrap();
        let after = reducer
            .reduce(Some(before.clone()), &Action::new("NOOP"))
            .unwrap()
            .unwrap();
        assert!(Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_missing_reducers_are_dropped() {
        let reducer = combine_reducers(
            ReducersMap::new()
                .slice("counter", counter())
                .maybe_slice::<i32>("ghost", None),
        );
        let state = reducer.reduce(None, &init_action()).unwrap().unwrap();
        assert!(state.contains_key("counter"));
        assert!(!state.contains_key("ghost"));
    }

    #[test]
    fn test_later_slice_replaces_earlier_key() {
        let map = ReducersMap::new().slice("counter", todos()).slice("counter", counter());
        assert_eq!(map.len(), 1);

        let state = combine_reducers(map).reduce(None, &init_action()).unwrap().unwrap();
        assert!(state.get::<i32>("counter").is_some());
    }

    #[test]
    fn test_shape_error_is_deferred_and_cached() {
        let probes = Rc::new(Cell::new(0));
        let counted = probes.clone();
        let bad: Reducer<i32> = Reducer::from_fn(move |state, _| {
            counted.set(counted.get() + 1);
            state
        });

        let reducer = combine_reducers(ReducersMap::new().slice("bad", bad));
        assert_eq!(probes.get(), 1);

        for _ in 0..2 {
            let err = reducer.reduce(None, &Action::new("ANY")).unwrap_err();
            assert!(matches!(
                err,
                StoreError::ReducerReturnedUndefined(ref m) if m.contains("during initialization")
            ));
        }
        assert_eq!(probes.get(), 1);
    }

    #[test]
    fn test_probe_catches_reducer_that_only_handles_init() {
        let init_only: Reducer<i32> = Reducer::from_fn(|state, action| {
            if action.is(action_types::init()) {
                Some(state.unwrap_or_else(|| Rc::new(0)))
            } else {
                state
            }
        });

        let reducer = combine_reducers(ReducersMap::new().slice("x", init_only));
        let err = reducer.reduce(None, &init_action()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::ReducerReturnedUndefined(ref m) if m.contains("probed with a random type")
        ));
    }

    #[test]
    fn test_absent_slice_result_names_key_and_action() {
        let flaky: Reducer<i32> = Reducer::from_fn(|state, action| {
            if action.is("DROP") {
                None
            } else {
                Some(state.unwrap_or_else(|| Rc::new(0)))
            }
        });
        let reducer = combine_reducers(ReducersMap::new().slice("flaky", flaky));
        let state = reducer.reduce(None, &init_action()).unwrap().unwrap();

        let err = reducer.reduce(Some(state), &Action::new("DROP")).unwrap_err();
        let StoreError::ReducerReturnedUndefined(message) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(message.contains("\"flaky\""));
        assert!(message.contains("\"DROP\""));
    }

    #[test]
    fn test_unexpected_keys_are_dropped() {
        let reducer = combine_reducers(ReducersMap::new().slice("counter", counter()));
        let preloaded = Rc::new(CombinedState::new().with("counter", 3).with("stale", "x"));

        let state = reducer.reduce(Some(preloaded.clone()), &init_action()).unwrap().unwrap();
        assert!(!Rc::ptr_eq(&preloaded, &state));
        assert!(!state.contains_key("stale"));
        assert_eq!(*state.get::<i32>("counter").unwrap(), 3);
    }

    #[test]
    fn test_slice_type_mismatch() {
        let reducer = combine_reducers(ReducersMap::new().slice("counter", counter()));
        let preloaded = Rc::new(CombinedState::new().with("counter", "three"));
        assert_eq!(
            reducer.reduce(Some(preloaded), &init_action()).unwrap_err(),
            StoreError::StateSliceMismatch {
                key: "counter".to_string()
            }
        );
    }

    #[test]
    fn test_warning_for_unexpected_keys_is_cached() {
        let keys = vec!["counter".to_string()];
        let state = CombinedState::new().with("counter", 1).with("stale", 2);
        let mut cache = HashSet::new();

        let first =
            unexpected_state_shape_warning(&state, &keys, &Action::new("A"), &mut cache).unwrap();
        assert!(first.contains("Unexpected key \"stale\""));
        assert!(first.contains("previous state received by the reducer"));

        assert!(
            unexpected_state_shape_warning(&state, &keys, &Action::new("A"), &mut cache).is_none()
        );
    }

    #[test]
    fn test_warning_names_preloaded_state_on_init() {
        let keys = vec!["counter".to_string()];
        let state = CombinedState::new().with("a", 1).with("b", 2);
        let mut cache = HashSet::new();

        let message =
            unexpected_state_shape_warning(&state, &keys, &init_action(), &mut cache).unwrap();
        assert!(message.contains("Unexpected keys \"a\", \"b\""));
        assert!(message.contains("preloaded state passed to create_store"));
    }

    #[test]
    fn test_no_warning_on_replace_but_keys_are_cached() {
        let keys = vec!["counter".to_string()];
        let state = CombinedState::new().with("old", 1);
        let mut cache = HashSet::new();

        let replace = Action::new(action_types::replace());
        assert!(unexpected_state_shape_warning(&state, &keys, &replace, &mut cache).is_none());
        assert!(cache.contains("old"));
    }

    #[test]
    fn test_warning_for_empty_reducer_map() {
        let mut cache = HashSet::new();
        let message =
            unexpected_state_shape_warning(&CombinedState::new(), &[], &init_action(), &mut cache);
        assert!(message.unwrap().contains("does not have a valid reducer"));
    }
}
