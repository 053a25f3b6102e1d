//! The continuation handed to every step.

use crate::error::BoxError;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A value tuple in transit between two steps, with its type erased.
pub type Pending = Box<dyn Any + Send>;

/// Receiver side of a continuation.
///
/// Implemented by the series orchestrator. A [`Next`] resumes the run it
/// belongs to at the position of the step that owns it.
#[doc(hidden)]
pub trait Resume: Send + Sync {
    /// The step at `position` completed, successfully or not.
    fn resume(self: Arc<Self>, position: usize, outcome: Result<Pending, BoxError>);

    /// The step at `position` dropped its continuation without calling it.
    ///
    /// Also called when the drop happens while a thread unwinds; the
    /// receiver knows whether it is capturing that panic itself.
    fn abandon(self: Arc<Self>, position: usize);
}

/// One-shot continuation for a step that forwards the value tuple `O`.
///
/// Calling it consumes it, so a step cannot complete twice. It may be
/// called before the step returns or later from any thread.
///
/// Dropping a `Next` without calling it counts as a failure of the owning
/// step (see `SeriesConfig::report_abandoned`). That includes a worker
/// thread or task panicking while it holds the continuation. Only a panic
/// raised inside the step's own invocation is reported as a panic instead.
///
/// # Examples
///
/// ```
/// use kusari_core::Next;
///
/// fn split(total: i32, next: Next<(i32, i32)>) {
///     if total < 0 {
///         next.fail("negative total");
///     } else {
///         next.ok((total / 2, total - total / 2));
///     }
/// }
/// ```
#[must_use = "a step must call its continuation exactly once"]
pub struct Next<O> {
    slot: Option<(Arc<dyn Resume>, usize)>,
    _values: PhantomData<fn(O)>,
}

/// The continuation of a value-free step: it carries only the error slot.
pub type Done = Next<()>;

impl<O> Next<O> {
    #[doc(hidden)]
    pub fn new(run: Arc<dyn Resume>, position: usize) -> Self {
        Self {
            slot: Some((run, position)),
            _values: PhantomData,
        }
    }

    /// Zero-based position of the step that owns this continuation.
    pub fn position(&self) -> usize {
        self.slot.as_ref().map_or(0, |(_, position)| *position)
    }
}

impl<O: Send + 'static> Next<O> {
    /// Completes the step: `Err` short-circuits the series, `Ok` forwards
    /// the values to the next step.
    pub fn call(mut self, outcome: Result<O, BoxError>) {
        if let Some((run, position)) = self.slot.take() {
            run.resume(position, outcome.map(|values| Box::new(values) as Pending));
        }
    }

    /// Completes the step successfully, forwarding `values`.
    pub fn ok(self, values: O) {
        self.call(Ok(values));
    }

    /// Fails the step. The remaining steps are skipped.
    pub fn fail(self, error: impl Into<BoxError>) {
        self.call(Err(error.into()));
    }
}

impl Next<()> {
    /// Completes a step that forwards nothing.
    pub fn done(self) {
        self.ok(());
    }
}

impl<O> Drop for Next<O> {
    fn drop(&mut self) {
        if let Some((run, position)) = self.slot.take() {
            run.abandon(position);
        }
    }
}

impl<O> fmt::Debug for Next<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("position", &self.position())
            .field("pending", &self.slot.is_some())
            .field("values", &std::any::type_name::<O>())
            .finish()
    }
}
