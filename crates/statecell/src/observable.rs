//! Observer protocol adapter for external reactive consumers
//!
//! Subscribing pushes the current state immediately, then again after every
//! dispatch, until the subscription is cancelled.

use crate::error::Result;
use crate::store::{Store, Unsubscribe};
use std::rc::Rc;

/// Receives state values
///
/// `next` defaults to doing nothing, so an observer only overrides what it needs.
/// Any `Fn(Rc<S>)` closure is an observer.
pub trait Observer<S: ?Sized> {
    fn next(&self, _state: Rc<S>) {}
}

impl<S: ?Sized, F> Observer<S> for F
where
    F: Fn(Rc<S>),
{
    fn next(&self, state: Rc<S>) {
        self(state)
    }
}

/// Observable view of a store's state
pub struct StateObservable<S: ?Sized + 'static> {
    store: Store<S>,
}

impl<S: ?Sized + 'static> StateObservable<S> {
    pub(crate) fn new(store: Store<S>) -> Self {
        Self { store }
    }

    /// Deliver the current state to `observer` now and after every change
    pub fn subscribe<O>(&self, observer: O) -> Result<ObservableSubscription>
    where
        O: Observer<S> + 'static,
    {
        let core = self.store.downgrade_core();
        let observe_state = move || {
            let Some(core) = core.upgrade() else {
                return;
            };
            match core.get_state() {
                Ok(state) => observer.next(state),
                Err(e) => log::error!("Observer could not read state: {}", e),
            }
        };

        observe_state();
        let unsubscribe = self.store.subscribe(observe_state)?;
        Ok(ObservableSubscription { unsubscribe })
    }
}

/// Returned by `StateObservable::subscribe`
#[derive(Debug, Clone)]
pub struct ObservableSubscription {
    unsubscribe: Unsubscribe,
}

impl ObservableSubscription {
    pub fn unsubscribe(&self) -> Result<()> {
        self.unsubscribe.unsubscribe()
    }
}
