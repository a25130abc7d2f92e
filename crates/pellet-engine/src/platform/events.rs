//! Event queue with per-kind callback tables.
//!
//! Platform code pushes [`Event`]s as they arrive; the frame loop calls
//! [`EventDispatcher::dispatch`] once per frame to drain the queue and invoke
//! the handlers registered for each event's kind.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use super::input::{Key, MouseButton};
use crate::geometry::Vec2;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Quit,
    KeyDown(Key),
    KeyUp(Key),
    MouseButtonDown(MouseButton),
    MouseButtonUp(MouseButton),
    MouseMotion(Vec2),
}

impl Event {
    /// The handler table key for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Quit => EventKind::Quit,
            Event::KeyDown(_) => EventKind::KeyDown,
            Event::KeyUp(_) => EventKind::KeyUp,
            Event::MouseButtonDown(_) => EventKind::MouseButtonDown,
            Event::MouseButtonUp(_) => EventKind::MouseButtonUp,
            Event::MouseMotion(_) => EventKind::MouseMotion,
        }
    }
}

/// Key for the handler table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Quit,
    KeyDown,
    KeyUp,
    MouseButtonDown,
    MouseButtonUp,
    MouseMotion,
}

// ---------------------------------------------------------------------------
// EventDispatcher
// ---------------------------------------------------------------------------

/// Identifies a registered handler so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u32);

pub type EventHandler = Box<dyn FnMut(&Event)>;

#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<EventKind, Vec<(HandlerId, EventHandler)>>,
    queue: VecDeque<Event>,
    next_id: u32,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handler_count())
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`. Handlers for the same kind
    /// run in registration order.
    pub fn add(&mut self, kind: EventKind, handler: impl FnMut(&Event) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        tracing::debug!(?kind, ?id, "event handler added");
        id
    }

    /// Unregister a handler. Returns `false` if it was not registered for
    /// `kind`.
    pub fn remove(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(h, _)| *h != id);
        let removed = list.len() < before;
        if removed {
            tracing::debug!(?kind, ?id, "event handler removed");
        }
        removed
    }

    /// Queue an event for the next dispatch.
    pub fn push(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Events queued since the last dispatch.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Handlers registered across all kinds.
    pub fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Drain the queue, invoking every handler registered for each event's
    /// kind. Returns the number of events drained.
    pub fn dispatch(&mut self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.queue.pop_front() {
            if let Some(list) = self.handlers.get_mut(&event.kind()) {
                for (_, handler) in list.iter_mut() {
                    handler(&event);
                }
            }
            drained += 1;
        }
        drained
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dispatch_routes_by_kind_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventDispatcher::new();
        let l1 = log.clone();
        events.add(EventKind::KeyDown, move |e| l1.borrow_mut().push(format!("first {e:?}")));
        let l2 = log.clone();
        events.add(EventKind::KeyDown, move |e| l2.borrow_mut().push(format!("second {e:?}")));
        let l3 = log.clone();
        events.add(EventKind::Quit, move |_| l3.borrow_mut().push("quit".to_owned()));

        events.push(Event::KeyDown(Key::A));
        events.push(Event::KeyUp(Key::A));
        events.push(Event::Quit);
        assert_eq!(events.pending(), 3);
        assert_eq!(events.dispatch(), 3);
        assert_eq!(events.pending(), 0);

        assert_eq!(
            *log.borrow(),
            vec!["first KeyDown(A)", "second KeyDown(A)", "quit"]
        );
    }

    #[test]
    fn removed_handler_is_not_called() {
        let hits = Rc::new(RefCell::new(0));
        let mut events = EventDispatcher::new();
        let h = hits.clone();
        let id = events.add(EventKind::Quit, move |_| *h.borrow_mut() += 1);
        assert!(events.remove(EventKind::Quit, id));
        assert!(!events.remove(EventKind::Quit, id));
        assert!(!events.remove(EventKind::KeyUp, id));
        events.push(Event::Quit);
        events.dispatch();
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn removing_one_handler_keeps_the_rest_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = EventDispatcher::new();
        let ids: Vec<HandlerId> = (0..3)
            .map(|i| {
                let l = log.clone();
                events.add(EventKind::KeyUp, move |_| l.borrow_mut().push(i))
            })
            .collect();
        assert!(events.remove(EventKind::KeyUp, ids[1]));
        assert_eq!(events.handler_count(), 2);

        events.push(Event::KeyUp(Key::S));
        events.dispatch();
        assert_eq!(*log.borrow(), vec![0, 2]);
    }

    #[test]
    fn dispatch_on_empty_queue() {
        let mut events = EventDispatcher::new();
        assert_eq!(events.dispatch(), 0);
    }
}
