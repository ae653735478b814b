use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Canvas,
    InstanceBuffer,
    Lighting,
    EnvironmentMap,
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("allocation of {kind:?} ({bytes} bytes) failed")]
    ResourceExhausted { kind: ResourceKind, bytes: usize },
}

#[derive(Debug, Default)]
struct TrackerState {
    next_id: u64,
    live: BTreeMap<u64, (ResourceKind, usize)>,
}

/// Ledger of every resource a device has handed out and not yet had back.
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    state: Rc<RefCell<TrackerState>>,
}

impl ResourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an allocation; the returned guard releases it on drop.
    #[must_use]
    pub fn register(&self, kind: ResourceKind, bytes: usize) -> GpuResource {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state.live.insert(id, (kind, bytes));
        GpuResource {
            id,
            kind,
            bytes,
            tracker: self.clone(),
        }
    }

    fn release(&self, id: u64) {
        self.state.borrow_mut().live.remove(&id);
    }

    pub fn live(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.state
            .borrow()
            .live
            .values()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn live_bytes(&self) -> usize {
        self.state.borrow().live.values().map(|(_, b)| b).sum()
    }

    /// Allocations made over the tracker's lifetime, released or not.
    pub fn total_allocations(&self) -> u64 {
        self.state.borrow().next_id
    }
}

/// A device-side allocation. Dropping it returns it to the device.
#[derive(Debug)]
pub struct GpuResource {
    id: u64,
    kind: ResourceKind,
    bytes: usize,
    tracker: ResourceTracker,
}

impl GpuResource {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Drop for GpuResource {
    fn drop(&mut self) {
        self.tracker.release(self.id);
    }
}

/// Source of the resources backing a particle surface.
pub trait GraphicsDevice {
    fn label(&self) -> &str;

    fn tracker(&self) -> &ResourceTracker;

    fn allocate(&mut self, kind: ResourceKind, bytes: usize) -> Result<GpuResource, SurfaceError>;
}

impl<D: GraphicsDevice + ?Sized> GraphicsDevice for Box<D> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn tracker(&self) -> &ResourceTracker {
        (**self).tracker()
    }

    fn allocate(&mut self, kind: ResourceKind, bytes: usize) -> Result<GpuResource, SurfaceError> {
        (**self).allocate(kind, bytes)
    }
}

/// Software device backing the terminal overlay; allocations always succeed.
#[derive(Debug, Default)]
pub struct TerminalDevice {
    tracker: ResourceTracker,
}

impl TerminalDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphicsDevice for TerminalDevice {
    fn label(&self) -> &str {
        "terminal"
    }

    fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    fn allocate(&mut self, kind: ResourceKind, bytes: usize) -> Result<GpuResource, SurfaceError> {
        Ok(self.tracker.register(kind, bytes))
    }
}

/// A device whose context can never be created, e.g. a headless session without a driver.
#[derive(Debug)]
pub struct UnavailableDevice {
    reason: String,
    tracker: ResourceTracker,
}

impl UnavailableDevice {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            tracker: ResourceTracker::new(),
        }
    }
}

impl GraphicsDevice for UnavailableDevice {
    fn label(&self) -> &str {
        "unavailable"
    }

    fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    fn allocate(
        &mut self,
        _kind: ResourceKind,
        _bytes: usize,
    ) -> Result<GpuResource, SurfaceError> {
        Err(SurfaceError::ContextUnavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_resource_releases_it() {
        let mut device = TerminalDevice::new();
        let canvas = device.allocate(ResourceKind::Canvas, 1024).expect("canvas");
        let buffer = device
            .allocate(ResourceKind::InstanceBuffer, 256)
            .expect("buffer");
        assert_eq!(device.tracker().live(), 2);
        assert_eq!(device.tracker().live_bytes(), 1280);
        drop(canvas);
        assert_eq!(device.tracker().live(), 1);
        assert_eq!(device.tracker().live_of(ResourceKind::Canvas), 0);
        drop(buffer);
        assert_eq!(device.tracker().live(), 0);
        assert_eq!(device.tracker().total_allocations(), 2);
    }

    #[test]
    fn unavailable_device_reports_reason() {
        let mut device = UnavailableDevice::new("no driver");
        let err = device
            .allocate(ResourceKind::Canvas, 1)
            .expect_err("must fail");
        assert!(err.to_string().contains("no driver"));
        assert_eq!(device.tracker().live(), 0);
    }

    #[test]
    fn boxed_devices_delegate() {
        let mut device: Box<dyn GraphicsDevice> = Box::new(TerminalDevice::new());
        let _lighting = device.allocate(ResourceKind::Lighting, 64).expect("lighting");
        assert_eq!(device.label(), "terminal");
        assert_eq!(device.tracker().live_of(ResourceKind::Lighting), 1);
    }
}
