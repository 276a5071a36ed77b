//! Pointer event bus and hit testing.
//!
//! Widgets register a listener for pointer-down events and keep the returned
//! [`Subscription`] alive for as long as they are mounted; dropping it
//! deregisters the listener.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box of a widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left and top edges are inclusive, right and bottom exclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub position: Point,
}

type Listener = Arc<dyn Fn(&PointerDown) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

/// Fan-out of pointer-down events to registered listeners.
#[derive(Clone, Default)]
pub struct PointerBus {
    registry: Arc<Registry>,
}

impl PointerBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide bus.
    pub fn global() -> &'static PointerBus {
        static GLOBAL: OnceLock<PointerBus> = OnceLock::new();
        GLOBAL.get_or_init(PointerBus::new)
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PointerDown) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners().push((id, Arc::new(listener)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers `event` to every listener and returns how many were notified.
    pub fn publish(&self, event: PointerDown) -> usize {
        // Snapshot first so listeners may (un)subscribe without deadlocking.
        let listeners: Vec<Listener> = self
            .listeners()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    fn listeners(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Listener)>> {
        self.registry
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registration handle; the listener is removed when this is dropped.
#[must_use = "dropping a Subscription immediately deregisters the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter(bus: &PointerBus) -> (Arc<AtomicUsize>, Subscription) {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        let sub = bus.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (hits, sub)
    }

    fn click(x: f32, y: f32) -> PointerDown {
        PointerDown {
            position: Point::new(x, y),
        }
    }

    #[test]
    fn bounds_hit_test() {
        let bounds = Bounds::new(10.0, 10.0, 100.0, 50.0);
        assert!(bounds.contains(Point::new(10.0, 10.0)));
        assert!(bounds.contains(Point::new(109.9, 59.9)));
        assert!(!bounds.contains(Point::new(110.0, 30.0)));
        assert!(!bounds.contains(Point::new(50.0, 9.0)));
        assert!(!bounds.contains(Point::new(-5.0, 30.0)));
    }

    #[test]
    fn publish_reaches_every_listener() {
        let bus = PointerBus::new();
        let (a, _sub_a) = counter(&bus);
        let (b, _sub_b) = counter(&bus);

        assert_eq!(bus.publish(click(1.0, 1.0)), 2);
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_deregisters() {
        let bus = PointerBus::new();
        let (kept, _kept_sub) = counter(&bus);
        let (gone, gone_sub) = counter(&bus);
        assert_eq!(bus.listener_count(), 2);

        drop(gone_sub);
        assert_eq!(bus.listener_count(), 1);

        bus.publish(click(0.0, 0.0));
        assert_eq!(kept.load(Ordering::SeqCst), 1);
        assert_eq!(gone.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = PointerBus::new();
        let (_hits, sub) = counter(&bus);
        drop(bus);
        drop(sub);
    }

    #[test]
    fn listener_may_subscribe_during_publish() {
        let bus = PointerBus::new();
        let inner_bus = bus.clone();
        let extra = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::clone(&extra);
        let _sub = bus.subscribe(move |_| {
            store.lock().unwrap().push(inner_bus.subscribe(|_| {}));
        });

        bus.publish(click(0.0, 0.0));
        assert_eq!(bus.listener_count(), 2);
    }
}
