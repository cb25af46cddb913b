//! Observation hooks invoked between simulation steps
//!
//! The simulator hands observers a read-only [`Frame`]; it blocks until the
//! observer returns, so rendering and simulation strictly alternate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::SimulationConfig;
use crate::graph::GraphModel;
use crate::layout::LayoutState;
use crate::vector::Vector2;

/// When a frame was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Right after the initial placement
    Initial,
    /// After the step with this 0-based index
    Step(usize),
    /// After the run ended, whatever the refresh interval
    Final,
}

/// Read-only snapshot of the layout handed to observers
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub kind: FrameKind,
    pub graph: &'a GraphModel,
    pub state: &'a LayoutState,
    pub config: &'a SimulationConfig,
}

impl<'a> Frame<'a> {
    pub fn temperature(&self) -> f64 {
        self.state.temperature()
    }

    pub fn position(&self, id: &str) -> Option<Vector2> {
        self.state.get(self.graph, id)
    }

    /// `(id, position)` pairs in graph order
    pub fn positions(&self) -> impl Iterator<Item = (&'a str, Vector2)> + 'a {
        self.state.iter(self.graph)
    }

    pub fn is_final(&self) -> bool {
        self.kind == FrameKind::Final
    }
}

/// Receives frames from a running simulation
pub trait Observer {
    fn observe(&mut self, frame: &Frame<'_>);

    /// Checked once per step boundary; returning `true` ends the run early
    fn should_stop(&self) -> bool {
        false
    }
}

/// Observes nothing
impl Observer for () {
    fn observe(&mut self, _frame: &Frame<'_>) {}
}

/// Observer backed by a closure, see [`from_fn`]
pub struct FnObserver<F>(F);

/// Wrap a closure as an [`Observer`]
pub fn from_fn<F>(f: F) -> FnObserver<F>
where
    F: FnMut(&Frame<'_>),
{
    FnObserver(f)
}

impl<F> Observer for FnObserver<F>
where
    F: FnMut(&Frame<'_>),
{
    fn observe(&mut self, frame: &Frame<'_>) {
        (self.0)(frame)
    }
}

/// Fans each frame out to several observers, in insertion order
#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn Observer + Send>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: impl Observer + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn with(mut self, observer: impl Observer + Send + 'static) -> Self {
        self.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Observer for ObserverSet {
    fn observe(&mut self, frame: &Frame<'_>) {
        for observer in &mut self.observers {
            observer.observe(frame);
        }
    }

    fn should_stop(&self) -> bool {
        self.observers.iter().any(|o| o.should_stop())
    }
}

/// Sleeps after every non-final frame, pacing a live display
pub struct Paced<O> {
    inner: O,
    delay: Duration,
}

impl<O: Observer> Paced<O> {
    pub fn new(inner: O, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<O: Observer> Observer for Paced<O> {
    fn observe(&mut self, frame: &Frame<'_>) {
        self.inner.observe(frame);
        if !frame.is_final() && !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }

    fn should_stop(&self) -> bool {
        self.inner.should_stop()
    }
}

/// Cooperative stop signal that can be raised from another thread
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Observer for StopSignal {
    fn observe(&mut self, _frame: &Frame<'_>) {}

    fn should_stop(&self) -> bool {
        self.is_stopped()
    }
}
