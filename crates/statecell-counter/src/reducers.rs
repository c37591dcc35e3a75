//! Slice reducers for the counter demo

use statecell::{combine_reducers, Action, CombinedState, Reducer, ReducersMap};
use std::rc::Rc;

pub const COUNTER: &str = "counter";
pub const HISTORY: &str = "history";

/// Counter slice: increment, decrement, reset, set
pub fn counter_reducer(initial: i64, step: i64) -> Reducer<i64> {
    Reducer::with_default(initial, move |state: &Rc<i64>, action: &Action| {
        match action.action_type() {
            "increment" => step_to(state, state.checked_add(step)),
            "decrement" => step_to(state, state.checked_sub(step)),
            "reset" => Rc::new(initial),
            "set" => match action.get("value").and_then(|v| v.as_i64()) {
                Some(value) if value != **state => Rc::new(value),
                _ => state.clone(),
            },
            _ => state.clone(),
        }
    })
}

/// Overflow leaves the counter where it was
fn step_to(state: &Rc<i64>, next: Option<i64>) -> Rc<i64> {
    match next {
        Some(next) => Rc::new(next),
        None => {
            log::warn!("Counter step overflows, keeping {}", state);
            state.clone()
        }
    }
}

/// History slice: the most recent application action types, oldest first
pub fn history_reducer(limit: usize) -> Reducer<Vec<String>> {
    Reducer::with_default(Vec::new(), move |state: &Rc<Vec<String>>, action: &Action| {
        if action.is_reserved() || limit == 0 {
            return state.clone();
        }
        let mut next = (**state).clone();
        next.push(action.action_type().to_string());
        let overflow = next.len().saturating_sub(limit);
        next.drain(..overflow);
        Rc::new(next)
    })
}

/// Root reducer
pub fn root_reducer(initial: i64, step: i64, history_limit: usize) -> Reducer<CombinedState> {
    combine_reducers(
        ReducersMap::new()
            .slice(COUNTER, counter_reducer(initial, step))
            .slice(HISTORY, history_reducer(history_limit)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use statecell::Store;

    #[test]
    fn test_counter_steps() {
        let store = Store::new(counter_reducer(10, 5)).unwrap();
        store.dispatch(Action::new("increment")).unwrap();
        store.dispatch(Action::new("increment")).unwrap();
        store.dispatch(Action::new("decrement")).unwrap();
        assert_eq!(*store.get_state().unwrap(), 15);

        store.dispatch(Action::new("reset")).unwrap();
        assert_eq!(*store.get_state().unwrap(), 10);
    }

    #[test]
    fn test_set_to_same_value_keeps_reference() {
        let store = Store::new(counter_reducer(3, 1)).unwrap();
        let before = store.get_state().unwrap();
        store.dispatch(Action::new("set").with("value", 3)).unwrap();
        assert!(Rc::ptr_eq(&before, &store.get_state().unwrap()));

        store.dispatch(Action::new("set").with("value", 8)).unwrap();
        assert_eq!(*store.get_state().unwrap(), 8);
    }

    #[test]
    fn test_counter_overflow_keeps_state() {
        let store = Store::new(counter_reducer(0, 1)).unwrap();
        store.dispatch(Action::new("set").with("value", i64::MAX)).unwrap();
        let before = store.get_state().unwrap();

        store.dispatch(Action::new("increment")).unwrap();
        assert!(Rc::ptr_eq(&before, &store.get_state().unwrap()));

        store.dispatch(Action::new("set").with("value", i64::MIN)).unwrap();
        store.dispatch(Action::new("decrement")).unwrap();
        assert_eq!(*store.get_state().unwrap(), i64::MIN);
    }

    #[test]
    fn test_history_is_bounded() {
        let store = Store::new(history_reducer(2)).unwrap();
        for action_type in ["a", "b", "c"] {
            store.dispatch(Action::new(action_type)).unwrap();
        }
        assert_eq!(*store.get_state().unwrap(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_root_reducer_initial_state() {
        let store = Store::new(root_reducer(7, 1, 5)).unwrap();
        let state = store.get_state().unwrap();
        assert_eq!(*state.get::<i64>(COUNTER).unwrap(), 7);
        assert!(state.get::<Vec<String>>(HISTORY).unwrap().is_empty());
    }
}
