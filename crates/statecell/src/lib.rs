//! A predictable, synchronous state container
//!
//! One store owns one cell of application state. The state only changes
//! when an [`Action`] is dispatched: the store runs the current [`Reducer`]
//! with the previous state and the action, keeps the result and notifies
//! its listeners.
//!
//! - [`combine_reducers`] builds one reducer out of independent slice reducers
//! - [`apply_middleware`] wraps dispatch with an ordered chain of [`Middleware`]
//! - [`compose`] / [`compose!`] chain functions right to left
//!
//! ```
//! use statecell::{Action, Reducer, Store};
//! use std::rc::Rc;
//!
//! let count = Reducer::with_default(0, |state: &Rc<i32>, action: &Action| {
//!     if action.is("INC") { Rc::new(**state + 1) } else { state.clone() }
//! });
//! let store = Store::new(count).unwrap();
//!
//! store.dispatch(Action::new("INC")).unwrap();
//! assert_eq!(*store.get_state().unwrap(), 1);
//! ```

mod action;
pub mod action_types;
mod bind;
mod combine;
mod compose;
mod dispatcher;
mod error;
mod listeners;
pub mod middleware;
mod observable;
mod reducer;
mod store;

pub use action::Action;
pub use bind::{bind_action_creator, bind_action_creators, ActionCreator, BoundActionCreator};
pub use combine::{combine_reducers, CombinedState, ReducersMap};
pub use compose::{compose, compose_once, BoxedFn, BoxedFnOnce};
pub use dispatcher::Dispatcher;
pub use error::{Result, StoreError};
pub use middleware::{
    apply_middleware, middleware_enhancer, LoggingMiddleware, Middleware, MiddlewareApi,
};
pub use observable::{ObservableSubscription, Observer, StateObservable};
pub use reducer::{ReduceResult, Reducer};
pub use store::{
    create_store, create_store_with_state, Store, StoreConfig, StoreCreator, StoreEnhancer,
    Unsubscribe,
};
