//! Bind action creators to a dispatcher
//!
//! A bound action creator builds the action and dispatches it in one call.

use crate::action::Action;
use crate::dispatcher::Dispatcher;
use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

/// An action creator taking an untyped argument
pub type ActionCreator = Rc<dyn Fn(Value) -> Action>;

/// An action creator that dispatches what it creates
pub type BoundActionCreator = Rc<dyn Fn(Value) -> Result<Action>>;

pub fn bind_action_creator<A, F>(creator: F, dispatcher: Dispatcher) -> impl Fn(A) -> Result<Action>
where
    F: Fn(A) -> Action,
{
    move |args| dispatcher.dispatch(creator(args))
}

/// Bind every creator in `creators`, keeping their names
pub fn bind_action_creators(
    creators: &BTreeMap<String, ActionCreator>,
    dispatcher: &Dispatcher,
) -> BTreeMap<String, BoundActionCreator> {
    creators
        .iter()
        .map(|(name, creator)| {
            let creator = creator.clone();
            let dispatcher = dispatcher.clone();
            let bound: BoundActionCreator = Rc::new(move |args| dispatcher.dispatch(creator(args)));
            (name.clone(), bound)
        })
        .collect()
}
