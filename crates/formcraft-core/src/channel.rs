//! Single-threaded typed event channel.
//!
//! Components exchange signals through an [`EventChannel`] handed to them at
//! construction instead of reaching for ambient globals. Handles are cheap
//! clones of one shared channel.
//!
//! Delivery is synchronous and in subscription order. An `emit` issued from
//! inside a subscriber is queued and delivered after the current event has
//! reached every subscriber, so events are always observed in emission order
//! and a subscriber is never re-entered.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`EventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<E> = Rc<dyn Fn(&E)>;

struct ChannelState<E> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback<E>)>,
    pending: Vec<E>,
    dispatching: bool,
}

/// A shared, typed publish/subscribe channel.
pub struct EventChannel<E> {
    state: Rc<RefCell<ChannelState<E>>>,
}

impl<E> Clone for EventChannel<E> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EventChannel")
            .field("subscribers", &state.subscribers.len())
            .field("pending", &state.pending.len())
            .field("dispatching", &state.dispatching)
            .finish()
    }
}

impl<E> EventChannel<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ChannelState {
                next_id: 1,
                subscribers: Vec::new(),
                pending: Vec::new(),
                dispatching: false,
            })),
        }
    }

    /// Register `callback` for every subsequently emitted event.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.subscribers.push((id, Rc::new(callback)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.state.borrow_mut();
        let before = state.subscribers.len();
        state.subscribers.retain(|(sid, _)| *sid != id);
        state.subscribers.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// Deliver `event` to every subscriber.
    pub fn emit(&self, event: E) {
        {
            let mut state = self.state.borrow_mut();
            state.pending.push(event);
            if state.dispatching {
                return;
            }
            state.dispatching = true;
        }

        loop {
            // Snapshot callbacks so subscribers may (un)subscribe while running.
            let (event, callbacks) = {
                let mut state = self.state.borrow_mut();
                if state.pending.is_empty() {
                    state.dispatching = false;
                    return;
                }
                let event = state.pending.remove(0);
                let callbacks: Vec<Callback<E>> = state
                    .subscribers
                    .iter()
                    .map(|(_, cb)| Rc::clone(cb))
                    .collect();
                (event, callbacks)
            };
            for callback in callbacks {
                callback(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_subscription_order() {
        let channel = EventChannel::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            channel.subscribe(move |n| log.borrow_mut().push(format!("{tag}{n}")));
        }
        channel.emit(1);
        channel.emit(2);
        assert_eq!(*log.borrow(), vec!["a1", "b1", "a2", "b2"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let channel = EventChannel::<u32>::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let id = channel.subscribe(move |_| *counter.borrow_mut() += 1);
        channel.emit(1);
        assert!(channel.unsubscribe(id));
        assert!(!channel.unsubscribe(id));
        channel.emit(2);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn reentrant_emit_is_queued() {
        let channel = EventChannel::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let channel2 = channel.clone();
            let log = Rc::clone(&log);
            channel.subscribe(move |n| {
                log.borrow_mut().push(("first", *n));
                if *n == 1 {
                    channel2.emit(2);
                }
            });
        }
        {
            let log = Rc::clone(&log);
            channel.subscribe(move |n| log.borrow_mut().push(("second", *n)));
        }
        channel.emit(1);
        assert_eq!(
            *log.borrow(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
    }
}
