//! Reducer - pure function that produces the next state from the previous state and an action
//!
//! The previous state is `None` until a reducer has produced one; returning
//! `None` is the absent result and is rejected by the store and by
//! `combine_reducers`. Returning the previous `Rc` unchanged signals "no change".

use crate::action::Action;
use crate::error::Result;
use std::fmt;
use std::rc::Rc;

/// What a reducer call produces
pub type ReduceResult<S> = Result<Option<Rc<S>>>;

/// Cloneable handle to a transition function `(state, action) -> state`
pub struct Reducer<S: ?Sized + 'static> {
    f: Rc<dyn Fn(Option<Rc<S>>, &Action) -> ReduceResult<S>>,
}

impl<S: ?Sized + 'static> Reducer<S> {
    /// Wrap a fallible reducer with full control over the result
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<Rc<S>>, &Action) -> ReduceResult<S> + 'static,
    {
        Self { f: Rc::new(f) }
    }

    /// Wrap an infallible reducer that may still return the absent result
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Option<Rc<S>>, &Action) -> Option<Rc<S>> + 'static,
    {
        Self::new(move |state, action| Ok(f(state, action)))
    }

    pub fn reduce(&self, state: Option<Rc<S>>, action: &Action) -> ReduceResult<S> {
        (self.f)(state, action)
    }
}

impl<S: 'static> Reducer<S> {
    /// Total reducer: an absent previous state is replaced by `initial`
    /// before `f` runs, so it always produces a state.
    ///
    /// ```
    /// use statecell::{Action, Reducer};
    /// use std::rc::Rc;
    ///
    /// let count = Reducer::with_default(0, |state: &Rc<i32>, action: &Action| {
    ///     if action.is("INC") { Rc::new(**state + 1) } else { state.clone() }
    /// });
    /// let next = count.reduce(None, &Action::new("INC")).unwrap().unwrap();
    /// assert_eq!(*next, 1);
    /// ```
    pub fn with_default<F>(initial: S, f: F) -> Self
    where
        F: Fn(&Rc<S>, &Action) -> Rc<S> + 'static,
    {
        let initial = Rc::new(initial);
        Self::new(move |state, action| {
            let state = state.unwrap_or_else(|| initial.clone());
            Ok(Some(f(&state, action)))
        })
    }
}

impl<S: ?Sized + 'static> Clone for Reducer<S> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<S: ?Sized + 'static> fmt::Debug for Reducer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action_types;

    fn counter() -> Reducer<i32> {
        Reducer::with_default(0, |state, action| match action.action_type() {
            "INC" => Rc::new(**state + 1),
            "DEC" => Rc::new(**state - 1),
            _ => state.clone(),
        })
    }

    #[test]
    fn test_init_yields_default() {
        let state = counter()
            .reduce(None, &Action::new(action_types::init()))
            .unwrap()
            .unwrap();
        assert_eq!(*state, 0);
    }

    #[test]
    fn test_unknown_action_keeps_reference() {
        let previous = Rc::new(5);
        let next = counter()
            .reduce(Some(previous.clone()), &Action::new("UNKNOWN"))
            .unwrap()
            .unwrap();
        assert!(Rc::ptr_eq(&previous, &next));
    }

    #[test]
    fn test_from_fn_can_return_absent() {
        let reducer: Reducer<i32> = Reducer::from_fn(|state, _| state);
        assert!(reducer.reduce(None, &Action::new("ANY")).unwrap().is_none());
    }
}
