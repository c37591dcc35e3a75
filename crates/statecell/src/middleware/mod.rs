//! Middleware system for the dispatch pipeline
//!
//! Middleware sits between `dispatch` and the reducer, allowing logging,
//! async orchestration and other cross-cutting concerns to be added without
//! touching the reducers.
//!
//! ## Design
//!
//! ```text
//! dispatch → first middleware → ... → last middleware → store dispatch → reducer
//! ```
//!
//! Each middleware receives the action and the `next` link of the chain. It
//! can:
//! - Inspect the action and the current state
//! - Forward the action (or a replacement) by calling `next.dispatch`
//! - Stop the action by not calling `next`
//! - Re-dispatch from the top of the chain with `api.dispatch`
//!
//! ## Example
//!
//! ```
//! use statecell::{apply_middleware, create_store, Action, Dispatcher, Middleware,
//!     MiddlewareApi, Reducer, Result, StoreConfig};
//! use std::rc::Rc;
//!
//! struct DropPings;
//!
//! impl Middleware<i32> for DropPings {
//!     fn handle(
//!         &self,
//!         _api: &MiddlewareApi<i32>,
//!         action: Action,
//!         next: &Dispatcher,
//!     ) -> Result<Action> {
//!         if action.is("PING") {
//!             return Ok(action); // never reaches the reducer
//!         }
//!         next.dispatch(action)
//!     }
//! }
//!
//! let reducer = Reducer::with_default(0, |state: &Rc<i32>, action: &Action| {
//!     if action.is("PING") { Rc::new(**state + 1) } else { state.clone() }
//! });
//! let middleware: Vec<Box<dyn Middleware<i32>>> = vec![Box::new(DropPings)];
//! let config = StoreConfig::new().enhancer(apply_middleware(middleware));
//! let store = create_store(reducer, config).unwrap();
//!
//! store.dispatch(Action::new("PING")).unwrap();
//! assert_eq!(*store.get_state().unwrap(), 0);
//! ```

use crate::action::Action;
use crate::compose::{compose_once, BoxedFnOnce};
use crate::dispatcher::{Dispatcher, WeakDispatcher};
use crate::error::{Result, StoreError};
use crate::reducer::Reducer;
use crate::store::{Store, StoreCreator, StoreEnhancer};
use std::cell::OnceCell;
use std::rc::Rc;

mod logging;

pub use logging::LoggingMiddleware;

/// Middleware trait - intercepts actions on their way to the reducer
pub trait Middleware<S: ?Sized + 'static> {
    /// Called once while the chain is being built, in declaration order
    ///
    /// `api.dispatch` fails with `DispatchDuringMiddlewareConstruction` here,
    /// because the other middleware would not see the action.
    fn setup(&mut self, _api: &MiddlewareApi<S>) -> Result<()> {
        Ok(())
    }

    /// Handle an action
    ///
    /// - `api`: read state, or dispatch through the whole chain
    /// - `action`: the action being dispatched
    /// - `next`: the rest of the chain; not calling it stops the action
    fn handle(&self, api: &MiddlewareApi<S>, action: Action, next: &Dispatcher) -> Result<Action>;
}

impl<S, F> Middleware<S> for F
where
    S: ?Sized + 'static,
    F: Fn(&MiddlewareApi<S>, Action, &Dispatcher) -> Result<Action>,
{
    fn handle(&self, api: &MiddlewareApi<S>, action: Action, next: &Dispatcher) -> Result<Action> {
        self(api, action, next)
    }
}

/// The part of the store middleware may use
pub struct MiddlewareApi<S: ?Sized + 'static> {
    store: Store<S>,
    chain: Rc<OnceCell<WeakDispatcher>>,
}

impl<S: ?Sized + 'static> MiddlewareApi<S> {
    pub fn get_state(&self) -> Result<Rc<S>> {
        self.store.get_state()
    }

    /// Dispatch from the top of the middleware chain
    ///
    /// Fails with `MiddlewareChainDropped` once every store handle owning the
    /// chain is gone, rather than bypassing the middleware.
    pub fn dispatch(&self, action: Action) -> Result<Action> {
        let Some(chain) = self.chain.get() else {
            return Err(StoreError::DispatchDuringMiddlewareConstruction);
        };
        let dispatcher = chain.upgrade().ok_or(StoreError::MiddlewareChainDropped)?;
        dispatcher.dispatch(action)
    }
}

impl<S: ?Sized + 'static> Clone for MiddlewareApi<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            chain: self.chain.clone(),
        }
    }
}

/// Build a store enhancer that routes `dispatch` through `middlewares`
///
/// The first middleware sees each action first. The last one forwards to
/// the store's own dispatch.
pub fn apply_middleware<S: ?Sized + 'static>(
    middlewares: Vec<Box<dyn Middleware<S>>>,
) -> impl FnOnce(StoreCreator<S>) -> StoreCreator<S> {
    move |create: StoreCreator<S>| -> StoreCreator<S> {
        Box::new(move |reducer: Reducer<S>, preloaded_state: Option<Rc<S>>| -> Result<Store<S>> {
            let store = create(reducer, preloaded_state)?;
            let chain = Rc::new(OnceCell::new());
            let api = MiddlewareApi {
                store: store.clone(),
                chain: chain.clone(),
            };

            let mut links: Vec<BoxedFnOnce<'static, Dispatcher>> =
                Vec::with_capacity(middlewares.len());
            for mut middleware in middlewares {
                middleware.setup(&api)?;
                let middleware: Rc<dyn Middleware<S>> = Rc::from(middleware);
                let api = api.clone();
                links.push(Box::new(move |next: Dispatcher| {
                    Dispatcher::new(move |action| middleware.handle(&api, action, &next))
                }));
            }

            let count = links.len();
            let dispatcher = compose_once(links)(store.dispatcher());
            if chain.set(dispatcher.downgrade()).is_err() {
                log::warn!("Middleware chain was already built");
            }
            log::debug!("Middleware chain built with {} link(s)", count);

            Ok(store.with_dispatcher(dispatcher))
        })
    }
}

/// Boxed form of `apply_middleware`, for combining with other enhancers
pub fn middleware_enhancer<S: ?Sized + 'static>(
    middlewares: Vec<Box<dyn Middleware<S>>>,
) -> StoreEnhancer<S> {
    Box::new(apply_middleware(middlewares))
}
