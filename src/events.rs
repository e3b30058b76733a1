//! Event listeners
//!
//! Agents and coordinators publish their results to any number of listeners.
//! Emission never holds a borrow of the listener list, so a listener may
//! subscribe, unsubscribe or trigger further events while it runs.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(0);

/// Identifies a subscription, for removal
///
/// Ids are unique across every listener list, so an id never removes a
/// listener from a list it was not issued by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Listener<T> = Rc<dyn Fn(&T)>;

/// A list of callbacks receiving `&T`
pub struct Listeners<T: ?Sized> {
    entries: RefCell<Vec<(ListenerId, Listener<T>)>>,
}

impl<T: ?Sized> Listeners<T> {
    /// No listeners
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Add a listener
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + 'static,
    {
        let id = ListenerId::next();
        let listener: Listener<T> = Rc::new(listener);
        self.entries.borrow_mut().push((id, listener));
        id
    }

    /// Remove a listener; false when it was not subscribed here
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Call every listener subscribed at the time of the call, in order
    pub fn emit(&self, payload: &T) {
        let snapshot: Vec<Listener<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(payload);
        }
    }

    /// Number of listeners
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// True without listeners
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}
