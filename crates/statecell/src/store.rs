//! Store - holds the state cell and runs the dispatch loop
//!
//! ```text
//! dispatch(action) → [middleware chain] → reducer → state → listeners
//! ```
//!
//! A `Store` is a cheap handle. Clones share the same engine, so a listener
//! or middleware can hold one and read state or dispatch from inside a
//! callback. The engine rejects reads, subscriptions and dispatches that
//! happen while the reducer itself is running.

use crate::action::Action;
use crate::action_types;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, StoreError};
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::observable::StateObservable;
use crate::reducer::Reducer;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// Builds a store from a reducer and an optional preloaded state
pub type StoreCreator<S> = Box<dyn FnOnce(Reducer<S>, Option<Rc<S>>) -> Result<Store<S>>>;

/// Wraps store creation, e.g. to install middleware
pub type StoreEnhancer<S> = Box<dyn FnOnce(StoreCreator<S>) -> StoreCreator<S>>;

/// Optional store construction settings
pub struct StoreConfig<S: ?Sized + 'static> {
    preloaded_state: Option<Rc<S>>,
    enhancer: Option<StoreEnhancer<S>>,
}

impl<S: ?Sized + 'static> StoreConfig<S> {
    pub fn new() -> Self {
        Self {
            preloaded_state: None,
            enhancer: None,
        }
    }

    /// Initial state handed to the reducer with the init action,
    /// e.g. state restored from a previous session
    pub fn preloaded_state(mut self, state: Rc<S>) -> Self {
        self.preloaded_state = Some(state);
        self
    }

    /// Store enhancer, which takes over store creation entirely
    pub fn enhancer<E>(mut self, enhancer: E) -> Self
    where
        E: FnOnce(StoreCreator<S>) -> StoreCreator<S> + 'static,
    {
        self.enhancer = Some(Box::new(enhancer));
        self
    }
}

impl<S: ?Sized + 'static> Default for StoreConfig<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a store
///
/// With an enhancer configured, the enhancer receives the base store
/// creator and is responsible for calling it. Otherwise the base store is
/// built directly: the reducer runs once with the init action so every part
/// of the state tree gets its initial value.
pub fn create_store<S: ?Sized + 'static>(
    reducer: Reducer<S>,
    config: StoreConfig<S>,
) -> Result<Store<S>> {
    let StoreConfig {
        preloaded_state,
        enhancer,
    } = config;

    match enhancer {
        Some(enhancer) => {
            let create: StoreCreator<S> = Box::new(create_base_store);
            enhancer(create)(reducer, preloaded_state)
        }
        None => create_base_store(reducer, preloaded_state),
    }
}

/// Create a store starting from `state`, without an enhancer
pub fn create_store_with_state<S: ?Sized + 'static>(
    reducer: Reducer<S>,
    state: Rc<S>,
) -> Result<Store<S>> {
    create_store(reducer, StoreConfig::new().preloaded_state(state))
}

fn create_base_store<S: ?Sized + 'static>(
    reducer: Reducer<S>,
    preloaded_state: Option<Rc<S>>,
) -> Result<Store<S>> {
    let init = Action::new(action_types::init());
    let state = reducer
        .reduce(preloaded_state, &init)?
        .ok_or_else(|| returned_absent(&init))?;

    let core = Rc::new(StoreCore {
        reducer: RefCell::new(reducer),
        state: RefCell::new(state),
        is_dispatching: Cell::new(false),
        listeners: RefCell::new(ListenerRegistry::new()),
    });
    log::debug!("Store created");

    let dispatcher = {
        let core = core.clone();
        Dispatcher::new(move |action| core.dispatch(action))
    };
    Ok(Store { core, dispatcher })
}

fn returned_absent(action: &Action) -> StoreError {
    StoreError::ReducerReturnedUndefined(format!(
        "When called with an action of type \"{}\", the reducer returned no state. \
         To ignore an action, you must explicitly return the previous state.",
        action.action_type()
    ))
}

/// Engine state shared by every handle to one store
pub(crate) struct StoreCore<S: ?Sized + 'static> {
    reducer: RefCell<Reducer<S>>,
    state: RefCell<Rc<S>>,
    is_dispatching: Cell<bool>,
    listeners: RefCell<ListenerRegistry>,
}

/// Holds the reentrancy flag for the duration of a reducer call, on every exit path
struct DispatchGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl<S: ?Sized + 'static> StoreCore<S> {
    pub(crate) fn get_state(&self) -> Result<Rc<S>> {
        if self.is_dispatching.get() {
            return Err(StoreError::ReentrantRead);
        }
        Ok(self.state.borrow().clone())
    }

    fn dispatch(&self, action: Action) -> Result<Action> {
        if self.is_dispatching.get() {
            return Err(StoreError::ReentrantDispatch);
        }

        let next = {
            let _guard = DispatchGuard::enter(&self.is_dispatching);
            let reducer = self.reducer.borrow().clone();
            let previous = self.state.borrow().clone();
            reducer.reduce(Some(previous), &action)?
        };
        let next = next.ok_or_else(|| returned_absent(&action))?;
        *self.state.borrow_mut() = next;

        let snapshot = self.listeners.borrow_mut().snapshot();
        snapshot.notify();

        Ok(action)
    }
}

/// Lets an `Unsubscribe` handle reach its store without knowing the state type
trait ListenerHost {
    fn is_dispatching(&self) -> bool;
    fn remove_listener(&self, id: ListenerId);
}

impl<S: ?Sized + 'static> ListenerHost for StoreCore<S> {
    fn is_dispatching(&self) -> bool {
        self.is_dispatching.get()
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.borrow_mut().remove(id);
    }
}

/// Store - owns the state, the current reducer and the listeners
pub struct Store<S: ?Sized + 'static> {
    core: Rc<StoreCore<S>>,
    dispatcher: Dispatcher,
}

impl<S: ?Sized + 'static> Store<S> {
    /// Create a plain store without preloaded state or enhancers
    pub fn new(reducer: Reducer<S>) -> Result<Self> {
        create_store(reducer, StoreConfig::new())
    }

    /// Read the current state
    ///
    /// Fails with `ReentrantRead` when called from inside a reducer.
    pub fn get_state(&self) -> Result<Rc<S>> {
        self.core.get_state()
    }

    /// Dispatch an action through this store's dispatcher
    ///
    /// This is the only way to change the state. The reducer is called with
    /// the current state and the action, the result becomes the new state and
    /// every subscribed listener is notified. Returns the dispatched action.
    pub fn dispatch(&self, action: Action) -> Result<Action> {
        self.dispatcher.dispatch(action)
    }

    /// Dispatch an untyped value, validating that it is a proper action first
    pub fn dispatch_value(&self, value: Value) -> Result<Action> {
        self.dispatch(Action::from_value(value)?)
    }

    /// Get the dispatcher
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Register a change listener
    ///
    /// Listeners are called after every dispatch, in registration order.
    /// Subscribing or unsubscribing from inside a listener takes effect from
    /// the next dispatch; the running notification pass is not affected.
    pub fn subscribe<F>(&self, listener: F) -> Result<Unsubscribe>
    where
        F: Fn() + 'static,
    {
        if self.core.is_dispatching.get() {
            return Err(StoreError::ReentrantSubscribe);
        }

        let id = self.core.listeners.borrow_mut().add(Rc::new(listener));
        let host: Weak<StoreCore<S>> = Rc::downgrade(&self.core);
        let host: Weak<dyn ListenerHost> = host;

        Ok(Unsubscribe {
            host,
            id,
            subscribed: Rc::new(Cell::new(true)),
        })
    }

    /// Swap the reducer and dispatch the replace action so the new reducer
    /// can initialize or migrate its part of the state
    pub fn replace_reducer(&self, next_reducer: Reducer<S>) -> Result<()> {
        *self.core.reducer.borrow_mut() = next_reducer;
        log::debug!("Reducer replaced");
        self.core.dispatch(Action::new(action_types::replace()))?;
        Ok(())
    }

    /// State changes exposed through the observer protocol
    pub fn observable(&self) -> StateObservable<S> {
        StateObservable::new(self.clone())
    }

    /// Same store, different dispatcher (used by enhancers)
    pub fn with_dispatcher(&self, dispatcher: Dispatcher) -> Self {
        Self {
            core: self.core.clone(),
            dispatcher,
        }
    }

    pub(crate) fn downgrade_core(&self) -> Weak<StoreCore<S>> {
        Rc::downgrade(&self.core)
    }
}

impl<S: ?Sized + 'static> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<S: ?Sized + 'static> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("is_dispatching", &self.core.is_dispatching.get())
            .finish_non_exhaustive()
    }
}

/// Handle returned by `Store::subscribe`
///
/// Calling `unsubscribe` more than once is a no-op. Dropping the handle does
/// not remove the listener.
#[derive(Clone)]
pub struct Unsubscribe {
    host: Weak<dyn ListenerHost>,
    id: ListenerId,
    subscribed: Rc<Cell<bool>>,
}

impl Unsubscribe {
    /// Remove the listener
    ///
    /// Fails with `ReentrantUnsubscribe` when called from inside a reducer.
    pub fn unsubscribe(&self) -> Result<()> {
        if !self.subscribed.get() {
            return Ok(());
        }

        let Some(host) = self.host.upgrade() else {
            self.subscribed.set(false);
            return Ok(());
        };

        if host.is_dispatching() {
            return Err(StoreError::ReentrantUnsubscribe);
        }

        self.subscribed.set(false);
        host.remove_listener(self.id);
        Ok(())
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.get()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("id", &self.id)
            .field("subscribed", &self.subscribed.get())
            .finish()
    }
}
