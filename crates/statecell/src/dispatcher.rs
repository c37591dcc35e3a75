//! Dispatcher - the callable entry point that actions are sent through
//!
//! A base store's dispatcher applies the action to the reducer directly.
//! After `apply_middleware`, the store's dispatcher is the head of the
//! middleware chain and every link forwards to the next `Dispatcher`.

use crate::action::Action;
use crate::error::Result;
use std::fmt;
use std::rc::{Rc, Weak};

type DispatchFn = dyn Fn(Action) -> Result<Action>;

/// Cloneable dispatch function
///
/// On success, dispatch returns the action that was dispatched, or whatever
/// action a middleware chose to return in its place.
#[derive(Clone)]
pub struct Dispatcher {
    f: Rc<DispatchFn>,
}

impl Dispatcher {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Action) -> Result<Action> + 'static,
    {
        Self { f: Rc::new(f) }
    }

    /// Dispatch an action
    pub fn dispatch(&self, action: Action) -> Result<Action> {
        (self.f)(action)
    }

    pub(crate) fn downgrade(&self) -> WeakDispatcher {
        WeakDispatcher {
            f: Rc::downgrade(&self.f),
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

/// Non-owning reference to a dispatcher, used where a strong one would form a cycle
#[derive(Clone)]
pub(crate) struct WeakDispatcher {
    f: Weak<DispatchFn>,
}

impl WeakDispatcher {
    pub(crate) fn upgrade(&self) -> Option<Dispatcher> {
        self.f.upgrade().map(|f| Dispatcher { f })
    }
}
