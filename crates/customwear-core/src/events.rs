//! Canvas events and scoped subscriptions.
//!
//! The canvas queues [`CanvasEvent`]s as it is mutated; the owner of the
//! canvas drains that queue and hands each event to an [`EventBus`].
//! Subscribing returns a [`Subscription`] guard that unsubscribes when dropped.

use crate::canvas::Canvas;
use crate::shapes::ObjectId;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Subscription topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ObjectCreated,
    ObjectSelected,
    ObjectDeselected,
    /// Position or size finalized.
    ObjectModified,
    /// Scale in progress.
    ObjectScaling,
    /// Drag in progress.
    ObjectMoving,
}

/// A structural change on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasEvent {
    ObjectCreated(ObjectId),
    ObjectSelected(ObjectId),
    /// The previously active object, if there was one.
    ObjectDeselected(Option<ObjectId>),
    ObjectModified(ObjectId),
    ObjectScaling(ObjectId),
    ObjectMoving(ObjectId),
}

impl CanvasEvent {
    pub fn topic(&self) -> Topic {
        match self {
            CanvasEvent::ObjectCreated(_) => Topic::ObjectCreated,
            CanvasEvent::ObjectSelected(_) => Topic::ObjectSelected,
            CanvasEvent::ObjectDeselected(_) => Topic::ObjectDeselected,
            CanvasEvent::ObjectModified(_) => Topic::ObjectModified,
            CanvasEvent::ObjectScaling(_) => Topic::ObjectScaling,
            CanvasEvent::ObjectMoving(_) => Topic::ObjectMoving,
        }
    }

    /// The object the event is about.
    pub fn target(&self) -> Option<ObjectId> {
        match *self {
            CanvasEvent::ObjectCreated(id)
            | CanvasEvent::ObjectSelected(id)
            | CanvasEvent::ObjectModified(id)
            | CanvasEvent::ObjectScaling(id)
            | CanvasEvent::ObjectMoving(id) => Some(id),
            CanvasEvent::ObjectDeselected(id) => id,
        }
    }
}

/// Callback invoked for matching events.
pub type Handler = Box<dyn FnMut(&mut Canvas, &CanvasEvent)>;

struct Entry {
    id: u64,
    topics: Vec<Topic>,
    /// Only events about this object, when set.
    target: Option<ObjectId>,
    handler: Rc<RefCell<Handler>>,
}

impl Entry {
    fn matches(&self, event: &CanvasEvent) -> bool {
        self.topics.contains(&event.topic())
            && self.target.is_none_or(|t| event.target() == Some(t))
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

/// Broadcasts canvas events to subscribed handlers.
#[derive(Default)]
pub struct EventBus {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handler_count()))
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `topics` for every object.
    pub fn subscribe(&self, topics: &[Topic], handler: Handler) -> Subscription {
        self.register(topics, None, handler)
    }

    /// Subscribe to `topics` for a single object.
    pub fn subscribe_object(&self, target: ObjectId, topics: &[Topic], handler: Handler) -> Subscription {
        self.register(topics, Some(target), handler)
    }

    fn register(&self, topics: &[Topic], target: Option<ObjectId>, handler: Handler) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push(Entry {
            id,
            topics: topics.to_vec(),
            target,
            handler: Rc::new(RefCell::new(handler)),
        });
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Deliver `event` to every matching handler, in subscription order.
    ///
    /// Handlers may drop subscriptions (including their own) while running.
    /// Returns the number of handlers called.
    pub fn emit(&self, canvas: &mut Canvas, event: &CanvasEvent) -> usize {
        let matching: Vec<(u64, Rc<RefCell<Handler>>)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|e| e.matches(event))
            .map(|e| (e.id, Rc::clone(&e.handler)))
            .collect();

        let mut called = 0;
        for (id, handler) in matching {
            if !self.is_registered(id) {
                continue;
            }
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    handler(canvas, event);
                    called += 1;
                }
                Err(_) => log::warn!("Skipping re-entrant handler {} for {:?}", id, event),
            }
        }
        called
    }

    fn is_registered(&self, id: u64) -> bool {
        self.registry.borrow().entries.iter().any(|e| e.id == id)
    }

    /// Number of live subscriptions.
    pub fn handler_count(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    /// Drop every subscription. Outstanding [`Subscription`] guards become inert.
    pub fn clear(&self) {
        self.registry.borrow_mut().entries.clear();
    }
}

/// Guard for a registered handler. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Whether the handler is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.borrow().entries.iter().any(|e| e.id == self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().entries.retain(|e| e.id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{CssColor, Rectangle};

    fn canvas() -> Canvas {
        Canvas::new(500, 500, CssColor::new("#ffffff"))
    }

    #[test]
    fn test_emit_filters_by_topic() {
        let bus = EventBus::new();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&hits);
        let _sub = bus.subscribe(
            &[Topic::ObjectModified],
            Box::new(move |_, e| sink.borrow_mut().push(*e)),
        );

        let mut canvas = canvas();
        let id = uuid::Uuid::new_v4();
        assert_eq!(bus.emit(&mut canvas, &CanvasEvent::ObjectMoving(id)), 0);
        assert_eq!(bus.emit(&mut canvas, &CanvasEvent::ObjectModified(id)), 1);
        assert_eq!(*hits.borrow(), vec![CanvasEvent::ObjectModified(id)]);
    }

    #[test]
    fn test_object_subscription_ignores_other_objects() {
        let bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let target = uuid::Uuid::new_v4();
        let c = Rc::clone(&count);
        let _sub = bus.subscribe_object(
            target,
            &[Topic::ObjectScaling],
            Box::new(move |_, _| *c.borrow_mut() += 1),
        );

        let mut canvas = canvas();
        bus.emit(&mut canvas, &CanvasEvent::ObjectScaling(uuid::Uuid::new_v4()));
        bus.emit(&mut canvas, &CanvasEvent::ObjectScaling(target));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        let sub = bus.subscribe(&[Topic::ObjectCreated], Box::new(|_, _| {}));
        assert_eq!(bus.handler_count(), 1);
        assert!(sub.is_active());
        drop(sub);
        assert_eq!(bus.handler_count(), 0);
    }

    #[test]
    fn test_handler_can_mutate_canvas() {
        let bus = EventBus::new();
        let _sub = bus.subscribe(
            &[Topic::ObjectCreated],
            Box::new(|canvas, event| {
                if let Some(shape) = event.target().and_then(|id| canvas.get_mut(id)) {
                    shape.props_mut().fill = CssColor::new("green");
                }
            }),
        );

        let mut canvas = canvas();
        let id = canvas.add(Rectangle::new(0.0, 0.0, 10.0, 10.0, "blue").into());
        for event in canvas.take_events() {
            bus.emit(&mut canvas, &event);
        }
        assert_eq!(canvas.get(id).map(|s| s.props().fill.as_str()), Some("green"));
    }

    #[test]
    fn test_guard_outliving_bus_is_inert() {
        let bus = EventBus::new();
        let sub = bus.subscribe(&[Topic::ObjectCreated], Box::new(|_, _| {}));
        drop(bus);
        assert!(!sub.is_active());
        drop(sub);
    }
}
