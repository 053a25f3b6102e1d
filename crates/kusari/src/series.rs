//! Statically typed series.
//!
//! The type parameter of [`Series`] is the value tuple the last added step
//! forwards. Adding a step requires it to accept exactly that tuple, and
//! only a series whose last step forwards `()` can be run, so arity and
//! type mismatches between adjacent steps are compile errors:
//!
//! ```compile_fail
//! use kusari::prelude::*;
//!
//! series()
//!     .then(|(): (), next: Next<(i32,)>| next.ok((1,)))
//!     .then(|(_s,): (String,), next: Next<()>| next.ok(()))
//!     .run(|_| {});
//! ```
//!
//! ```compile_fail
//! use kusari::prelude::*;
//!
//! // One value is still pending when the terminal handler would run.
//! series()
//!     .then(|(): (), next: Next<(i32,)>| next.ok((1,)))
//!     .run(|_| {});
//! ```

use crate::engine::Plan;
use kusari_core::{Next, PanicPolicy, SeriesConfig, SeriesError, StepInfo, StepName, Values};
use std::fmt;
use std::marker::PhantomData;

/// A series whose steps pass typed value tuples along.
///
/// Each step receives the previous step's tuple as its first argument and
/// a [`Next`] for the tuple it forwards.
///
/// # Examples
///
/// ```
/// use kusari::prelude::*;
/// use std::sync::mpsc;
///
/// let (tx, rx) = mpsc::channel();
/// let sums = tx.clone();
///
/// series()
///     .then(|(): (), next: Next<(i32,)>| next.ok((1,)))
///     .then(|(x,): (i32,), next: Next<(i32, i32)>| next.ok((x + 1, x + 2)))
///     .then(move |(a, b): (i32, i32), next: Next<()>| {
///         sums.send(Ok(a + b)).unwrap_or(());
///         next.ok(())
///     })
///     .run(move |outcome| tx.send(outcome.map(|()| 0)).unwrap_or(()));
///
/// assert!(matches!(rx.recv(), Ok(Ok(5))));
/// assert!(matches!(rx.recv(), Ok(Ok(0))));
/// ```
pub struct Series<O = ()> {
    plan: Plan,
    _values: PhantomData<fn() -> O>,
}

impl<O> fmt::Debug for Series<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Series")
            .field("plan", &self.plan)
            .field("pending", &std::any::type_name::<O>())
            .finish()
    }
}

impl Default for Series<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl Series<()> {
    /// Creates an empty series. The first step receives `()`.
    pub fn new() -> Self {
        Self {
            plan: Plan::new(),
            _values: PhantomData,
        }
    }

    /// Runs the series, calling `terminal` exactly once with the outcome.
    pub fn run<T>(self, terminal: T)
    where
        T: FnOnce(Result<(), SeriesError>) + Send + 'static,
    {
        self.plan.start(Box::new(terminal));
    }

    /// Runs the series and waits for its outcome.
    pub async fn run_async(self) -> Result<(), SeriesError> {
        crate::bridge::settle(self.plan).await
    }
}

impl<O: Values> Series<O> {
    /// Appends a step consuming the pending tuple `O` and forwarding `O2`.
    pub fn then<O2, F>(self, step: F) -> Series<O2>
    where
        O2: Values,
        F: FnOnce(O, Next<O2>) + Send + 'static,
    {
        self.push(None, step)
    }

    /// Appends a step with an explicit name.
    pub fn then_named<O2, F>(self, name: impl Into<StepName>, step: F) -> Series<O2>
    where
        O2: Values,
        F: FnOnce(O, Next<O2>) + Send + 'static,
    {
        self.push(Some(name.into()), step)
    }

    fn push<O2, F>(mut self, name: Option<StepName>, step: F) -> Series<O2>
    where
        O2: Values,
        F: FnOnce(O, Next<O2>) + Send + 'static,
    {
        self.plan.push(name, step);
        Series {
            plan: self.plan,
            _values: PhantomData,
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: SeriesConfig) -> Self {
        *self.plan.config_mut() = config;
        self
    }

    /// Sets the label used in log lines.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.plan.config_mut().label = label.into();
        self
    }

    /// Sets how panics raised by steps are handled.
    pub fn with_panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.plan.config_mut().panic_policy = policy;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SeriesConfig {
        self.plan.config()
    }

    /// Returns the steps in order, with their resolved value types.
    pub fn steps(&self) -> &[StepInfo] {
        self.plan.infos()
    }

    /// Returns the number of steps.
    pub fn len(&self) -> usize {
        self.plan.infos().len()
    }

    /// Returns `true` if the series has no steps.
    pub fn is_empty(&self) -> bool {
        self.plan.infos().is_empty()
    }
}

/// Creates an empty statically typed series.
pub fn series() -> Series<()> {
    Series::new()
}
