use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use crate::domain::FrameCadence;

/// Minimum spacing between self-requested frames on an on-demand registration, in seconds.
pub const ON_DEMAND_INTERVAL: f32 = 1.0 / 20.0;

#[derive(Debug)]
struct Registration {
    cadence: FrameCadence,
    invalidated: bool,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    entries: BTreeMap<u64, Registration>,
}

/// Per-frame callback registry on the display's single tick.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    registry: Rc<RefCell<Registry>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers for frames. A fresh registration is invalidated, so its first tick fires.
    #[must_use]
    pub fn register(&self, cadence: FrameCadence) -> FrameHandle {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.insert(
            id,
            Registration {
                cadence,
                invalidated: true,
            },
        );
        FrameHandle {
            id,
            cadence,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn active(&self) -> usize {
        self.registry.borrow().entries.len()
    }
}

/// Cancellation handle for a frame registration; dropping it unregisters.
#[derive(Debug)]
pub struct FrameHandle {
    id: u64,
    cadence: FrameCadence,
    registry: Weak<RefCell<Registry>>,
}

impl FrameHandle {
    pub fn cadence(&self) -> FrameCadence {
        self.cadence
    }

    pub fn is_registered(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.borrow().entries.contains_key(&self.id))
    }

    /// Requests a frame on the next tick. No effect on continuous registrations.
    pub fn invalidate(&self) {
        self.with_entry(|entry| entry.invalidated = true);
    }

    /// Whether this tick should render; consumes a pending invalidation.
    pub fn take_frame(&self) -> bool {
        let mut fire = false;
        self.with_entry(|entry| {
            fire = match entry.cadence {
                FrameCadence::Continuous => true,
                FrameCadence::OnDemand => std::mem::take(&mut entry.invalidated),
            };
        });
        fire
    }

    pub fn cancel(self) {}

    fn with_entry(&self, f: impl FnOnce(&mut Registration)) {
        if let Some(registry) = self.registry.upgrade()
            && let Some(entry) = registry.borrow_mut().entries.get_mut(&self.id)
        {
            f(entry);
        }
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().entries.remove(&self.id);
        }
    }
}
