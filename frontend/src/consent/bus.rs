use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::consent::record::ConsentRecord;

type Listener = Rc<dyn Fn(Option<&ConsentRecord>)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Same-origin change notifications. `None` means the decision was cleared.
/// Delivery is fire-and-forget: only views subscribed right now hear about it.
#[derive(Clone, Default)]
pub struct ConsentBus {
    listeners: Rc<RefCell<Listeners>>,
}

impl ConsentBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Option<&ConsentRecord>) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn notify(&self, record: Option<&ConsentRecord>) {
        // Snapshot first so listeners may subscribe or unsubscribe while being called.
        let snapshot: Vec<Listener> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in snapshot {
            listener(record);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// Unsubscribes when dropped.
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn delivers_to_live_subscribers_only() {
        let bus = ConsentBus::new();
        let seen = Rc::new(Cell::new(0));

        let first = {
            let seen = seen.clone();
            bus.subscribe(move |_| seen.set(seen.get() + 1))
        };
        let second = {
            let seen = seen.clone();
            bus.subscribe(move |record| {
                assert!(record.is_none());
                seen.set(seen.get() + 10)
            })
        };
        bus.notify(None);
        assert_eq!(seen.get(), 11);

        drop(second);
        assert_eq!(bus.listener_count(), 1);
        bus.notify(None);
        assert_eq!(seen.get(), 12);

        drop(first);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = ConsentBus::new();
        let subscription = bus.subscribe(|_| {});
        drop(bus);
        drop(subscription);
    }
}
