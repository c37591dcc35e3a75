//! Error types for the store engine

use thiserror::Error;

/// Errors raised by the store, the reducer composer and the middleware pipeline
///
/// Every error is returned synchronously from the call that caused it. Nothing
/// in this crate catches or retries them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    // The four `Invalid*` shape errors below are never produced by the typed
    // API, where closures and trait bounds guarantee callability. They stay
    // in the enum so the error list matches every misuse the store defines.
    #[error("Expected the enhancer to be a function. Instead, received: {0}")]
    InvalidEnhancer(String),

    #[error("Expected the reducer to be a function. Instead, received: {0}")]
    InvalidReducer(String),

    #[error("Expected the listener to be a function. Instead, received: {0}")]
    InvalidListener(String),

    #[error("Expected the observer to be an object. Instead, received: {0}")]
    InvalidObserver(String),

    #[error("Actions must be plain objects. Instead, the actual type was: '{0}'")]
    InvalidAction(String),

    #[error(
        "Action \"type\" property must not be absent. \
         You may have misspelled an action type string constant."
    )]
    MissingActionType,

    #[error("Reducers may not dispatch actions.")]
    ReentrantDispatch,

    #[error(
        "You may not call store.get_state() while the reducer is executing. \
         The reducer has already received the state as an argument. \
         Pass it down from the top reducer instead of reading it from the store."
    )]
    ReentrantRead,

    #[error(
        "You may not call store.subscribe() while the reducer is executing. \
         If you would like to be notified after the store has been updated, \
         subscribe from a component and invoke store.get_state() in the callback \
         to access the latest state."
    )]
    ReentrantSubscribe,

    #[error("You may not unsubscribe from a store listener while the reducer is executing.")]
    ReentrantUnsubscribe,

    #[error("{0}")]
    ReducerReturnedUndefined(String),

    #[error(
        "Dispatching while constructing your middleware is not allowed. \
         Other middleware would not be applied to this dispatch."
    )]
    DispatchDuringMiddlewareConstruction,

    #[error(
        "The store behind this middleware API has been dropped. \
         The action was not dispatched."
    )]
    MiddlewareChainDropped,

    #[error("The state slice for key \"{key}\" does not have the type its reducer expects")]
    StateSliceMismatch { key: String },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, StoreError>;
