//! Synchronous observer lists.
//!
//! # Responsibility
//! - Let core components publish typed change events to the UI shell.
//!
//! # Invariants
//! - Delivery is synchronous and in subscription order.
//! - Every emitted event reaches every listener subscribed at emit time.

use std::fmt::{Debug, Formatter};

/// Handle returned by `subscribe`, used to unsubscribe.
pub type SubscriptionId = u64;

type Listener<E> = Box<dyn FnMut(&E)>;

/// Ordered list of event listeners.
pub struct Listeners<E> {
    next_id: SubscriptionId,
    entries: Vec<(SubscriptionId, Listener<E>)>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            next_id: 1,
            entries: Vec::new(),
        }
    }
}

impl<E> Listeners<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Debug for Listeners<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Listeners;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn emits_in_subscription_order_and_unsubscribes() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::<u32>::new();

        let first = Rc::clone(&seen);
        let first_id = listeners.subscribe(move |value| first.borrow_mut().push(("a", *value)));
        let second = Rc::clone(&seen);
        listeners.subscribe(move |value| second.borrow_mut().push(("b", *value)));

        listeners.emit(&1);
        assert!(listeners.unsubscribe(first_id));
        assert!(!listeners.unsubscribe(first_id));
        listeners.emit(&2);

        assert_eq!(*seen.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
        assert_eq!(listeners.len(), 1);
    }
}
