use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;

use vdma_shared::ConfirmLatch;

/// Runs a task once after a delay. Dropping the handle cancels the task.
pub trait Scheduler {
    type Handle;

    fn after(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Browser timers.
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn after(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, task)
    }
}

/// Dispatch confirmation: fires the latch, then releases it once the hold
/// elapses. Dropping the controller cancels a pending release.
pub struct DispatchController<S: Scheduler> {
    scheduler: S,
    latch: Rc<Cell<ConfirmLatch>>,
    on_change: Rc<dyn Fn(bool)>,
    pending: Option<S::Handle>,
}

impl<S: Scheduler> DispatchController<S> {
    pub fn new(scheduler: S, latch: ConfirmLatch, on_change: impl Fn(bool) + 'static) -> Self {
        Self {
            scheduler,
            latch: Rc::new(Cell::new(latch)),
            on_change: Rc::new(on_change),
            pending: None,
        }
    }

    /// Confirms at `now_ms` and restarts the hold. A release scheduled by an
    /// earlier fire is cancelled.
    pub fn fire(&mut self, now_ms: f64) {
        self.pending = None;
        let mut latch = self.latch.get();
        latch.fire(now_ms);
        self.latch.set(latch);
        (self.on_change)(true);

        let shared = self.latch.clone();
        let on_change = self.on_change.clone();
        let delay = latch.hold_ms().max(0.0).ceil() as u32;
        self.pending = Some(self.scheduler.after(
            delay,
            Box::new(move || {
                let mut latch = shared.get();
                latch.release();
                shared.set(latch);
                on_change(false);
            }),
        ));
    }

    pub fn is_confirmed(&self) -> bool {
        self.latch.get().is_confirmed()
    }
}
