#![forbid(unsafe_code)]

//! Per-frame callback scheduling.
//!
//! A [`FrameClock`] delivers one [`FrameSample`] per display refresh to each
//! registered callback until that callback's [`FrameHandle`] is stopped. Hosts
//! provide the real implementation (`requestAnimationFrame`, a paced terminal
//! loop); [`ManualFrameClock`] is the deterministic, host-driven one used for
//! tests and headless runs.
//!
//! # Cancellation
//!
//! Every handle carries a shared cancellation flag that the clock checks
//! immediately before each invocation. Once [`FrameClock::stop`] returns, the
//! callback is never called again, even if the host had already queued the
//! next frame. Stopping twice is a no-op.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// One display refresh tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    /// Monotonic platform timestamp in milliseconds.
    pub timestamp_ms: f64,
}

impl FrameSample {
    #[must_use]
    pub const fn new(timestamp_ms: f64) -> Self {
        Self { timestamp_ms }
    }
}

/// Callback invoked once per frame.
pub type FrameCallback = Box<dyn FnMut(FrameSample)>;

/// Cancellation handle returned by [`FrameClock::start`].
#[derive(Debug, Clone)]
pub struct FrameHandle {
    id: u64,
    cancelled: Rc<Cell<bool>>,
}

impl FrameHandle {
    /// Create a live handle with the given id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    /// Mark the handle cancelled. Visible to every clone.
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }
}

impl PartialEq for FrameHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FrameHandle {}

/// Host per-frame scheduler.
pub trait FrameClock {
    /// Register `callback` to run on every subsequent frame.
    fn start(&mut self, callback: FrameCallback) -> FrameHandle;

    /// Stop the callback behind `handle`. Idempotent.
    fn stop(&mut self, handle: &FrameHandle);
}

/// Something that wants to observe every frame.
pub trait FrameConsumer {
    fn on_frame(&mut self, sample: FrameSample);
}

/// Register `consumer` with `clock`.
///
/// The clock only holds a weak reference: dropping the last strong
/// reference to the consumer silences the callback without needing `stop`.
/// A frame that arrives while the consumer is already borrowed (re-entrant
/// delivery) is skipped.
pub fn attach<C, T>(clock: &mut C, consumer: &Rc<RefCell<T>>) -> FrameHandle
where
    C: FrameClock + ?Sized,
    T: FrameConsumer + 'static,
{
    let weak: Weak<RefCell<T>> = Rc::downgrade(consumer);
    clock.start(Box::new(move |sample| {
        let Some(consumer) = weak.upgrade() else {
            return;
        };
        if let Ok(mut consumer) = consumer.try_borrow_mut() {
            consumer.on_frame(sample);
        } else {
            crate::trace!("frame skipped: consumer busy");
        }
    }))
}

struct Registration {
    handle: FrameHandle,
    callback: FrameCallback,
}

#[derive(Default)]
struct ManualInner {
    next_id: u64,
    registrations: Vec<Registration>,
    frames: u64,
    now_ms: f64,
}

/// Deterministic frame clock advanced explicitly by the host.
///
/// Clones share the same schedule, so a test can keep one clone and hand
/// another to the component under test.
#[derive(Clone, Default)]
pub struct ManualFrameClock {
    inner: Rc<RefCell<ManualInner>>,
}

impl core::fmt::Debug for ManualFrameClock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ManualFrameClock")
            .field("active", &inner.registrations.len())
            .field("frames", &inner.frames)
            .field("now_ms", &inner.now_ms)
            .finish()
    }
}

impl ManualFrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one frame at `timestamp_ms` to every live callback.
    ///
    /// Callbacks registered during delivery first run on the next tick, like
    /// `requestAnimationFrame`.
    pub fn tick(&self, timestamp_ms: f64) {
        let mut batch = {
            let mut inner = self.inner.borrow_mut();
            inner.frames += 1;
            inner.now_ms = timestamp_ms;
            std::mem::take(&mut inner.registrations)
        };

        let sample = FrameSample::new(timestamp_ms);
        for reg in &mut batch {
            if !reg.handle.is_cancelled() {
                (reg.callback)(sample);
            }
        }

        let mut inner = self.inner.borrow_mut();
        batch.retain(|reg| !reg.handle.is_cancelled());
        let added = std::mem::take(&mut inner.registrations);
        batch.extend(added.into_iter().filter(|reg| !reg.handle.is_cancelled()));
        inner.registrations = batch;
    }

    /// Deliver `frames` ticks spaced `interval_ms` apart, starting at `start_ms`.
    pub fn run(&self, start_ms: f64, interval_ms: f64, frames: usize) {
        for i in 0..frames {
            self.tick(start_ms + interval_ms * i as f64);
        }
    }

    /// Number of callbacks that would run on the next tick.
    #[must_use]
    pub fn active(&self) -> usize {
        self.inner
            .borrow()
            .registrations
            .iter()
            .filter(|reg| !reg.handle.is_cancelled())
            .count()
    }

    /// Total ticks delivered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.inner.borrow().frames
    }

    /// Timestamp of the last tick.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.inner.borrow().now_ms
    }
}

impl FrameClock for ManualFrameClock {
    fn start(&mut self, callback: FrameCallback) -> FrameHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let handle = FrameHandle::new(inner.next_id);
        inner.registrations.push(Registration {
            handle: handle.clone(),
            callback,
        });
        handle
    }

    fn stop(&mut self, handle: &FrameHandle) {
        handle.cancel();
        // May be called from inside a callback while the batch is detached;
        // the cancelled flag alone is enough in that case.
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.registrations.retain(|reg| reg.handle != *handle);
        }
    }
}
