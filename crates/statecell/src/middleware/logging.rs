//! LoggingMiddleware - logs all actions for debugging

use super::{Middleware, MiddlewareApi};
use crate::action::Action;
use crate::dispatcher::Dispatcher;
use crate::error::Result;

/// LoggingMiddleware - logs every action that passes through the chain
///
/// Reserved store actions are skipped to reduce noise. The action is always
/// forwarded.
pub struct LoggingMiddleware {
    level: log::Level,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self {
            level: log::Level::Debug,
        }
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized + 'static> Middleware<S> for LoggingMiddleware {
    fn handle(&self, _api: &MiddlewareApi<S>, action: Action, next: &Dispatcher) -> Result<Action> {
        if !action.is_reserved() {
            log::log!(self.level, "Action: {:?}", action);
        }

        let result = next.dispatch(action);
        if let Err(e) = &result {
            log::log!(self.level, "Dispatch failed: {}", e);
        }
        result
    }
}
