//! Listener registry with copy-on-write snapshots
//!
//! `next` is the list that subscribe/unsubscribe mutate. At the start of each
//! notification pass it is published as `current` and the pass iterates that
//! snapshot. The two share one allocation until the next mutation, which
//! copies (`Rc::make_mut`) instead of disturbing a pass in progress.

use std::rc::Rc;

pub(crate) type Listener = Rc<dyn Fn()>;

/// Identifies one registration, stable for the lifetime of the store
pub(crate) type ListenerId = u64;

#[derive(Clone)]
struct Entry {
    id: ListenerId,
    listener: Listener,
}

pub(crate) struct ListenerRegistry {
    current: Rc<Vec<Entry>>,
    next: Rc<Vec<Entry>>,
    next_id: ListenerId,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        let empty = Rc::new(Vec::new());
        Self {
            current: empty.clone(),
            next: empty,
            next_id: 0,
        }
    }

    pub(crate) fn add(&mut self, listener: Listener) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        Rc::make_mut(&mut self.next).push(Entry { id, listener });
        id
    }

    /// Removing an id that is no longer registered is a no-op
    pub(crate) fn remove(&mut self, id: ListenerId) {
        if self.next.iter().any(|entry| entry.id == id) {
            Rc::make_mut(&mut self.next).retain(|entry| entry.id != id);
        }
    }

    /// Publish `next` as the list for a notification pass
    pub(crate) fn snapshot(&mut self) -> Snapshot {
        self.current = self.next.clone();
        Snapshot {
            entries: self.current.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.next.len()
    }
}

/// Listeners captured for one notification pass
pub(crate) struct Snapshot {
    entries: Rc<Vec<Entry>>,
}

impl Snapshot {
    pub(crate) fn notify(&self) {
        for entry in self.entries.iter() {
            (entry.listener)();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Listener {
        let log = log.clone();
        Rc::new(move || log.borrow_mut().push(name))
    }

    #[test]
    fn test_notifies_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.add(recorder(&log, "a"));
        registry.add(recorder(&log, "b"));

        registry.snapshot().notify();
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_is_isolated_from_mutation() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        let a = registry.add(recorder(&log, "a"));

        let snapshot = registry.snapshot();
        registry.remove(a);
        registry.add(recorder(&log, "b"));
        snapshot.notify();
        assert_eq!(*log.borrow(), vec!["a"]);

        log.borrow_mut().clear();
        registry.snapshot().notify();
        assert_eq!(*log.borrow(), vec!["b"]);
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut registry = ListenerRegistry::new();
        registry.add(Rc::new(|| {}));
        registry.remove(42);
        assert_eq!(registry.len(), 1);
    }
}
