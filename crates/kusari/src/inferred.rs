//! Series whose value types are read off each step's parameter list.

use crate::engine::Plan;
use kusari_core::{
    IntoStep, Next, PanicPolicy, SeriesConfig, SeriesError, StepInfo, StepName, Values,
};
use std::fmt;
use std::marker::PhantomData;

/// A series that resolves each step's inputs and outputs from its
/// signature.
///
/// A step is a closure whose last parameter is a [`Next`](kusari_core::Next)
/// and whose preceding parameters are the values it consumes, spread out
/// rather than packed in a tuple. Parameter types must be annotated; they
/// are what the resolver reads.
///
/// # Examples
///
/// ```
/// use kusari::prelude::*;
/// use std::sync::mpsc;
///
/// let (tx, rx) = mpsc::channel();
///
/// inferred_series()
///     .then(|next: Next<(i32,)>| next.ok((1,)))
///     .then(|x: i32, next: Next<(i32, i32)>| next.ok((x + 1, x + 2)))
///     .then(|a: i32, b: i32, next: Next<()>| {
///         assert_eq!((a, b), (2, 3));
///         next.ok(())
///     })
///     .run(move |outcome| tx.send(outcome.is_ok()).unwrap_or(()));
///
/// assert_eq!(rx.recv().ok(), Some(true));
/// ```
///
/// Arity mismatches are rejected at compile time:
///
/// ```compile_fail
/// use kusari::prelude::*;
///
/// inferred_series()
///     .then(|next: Next<(i32, i32)>| next.ok((1, 2)))
///     .then(|x: i32, next: Next<()>| next.ok(()))
///     .run(|_| {});
/// ```
pub struct InferredSeries<O = ()> {
    plan: Plan,
    _values: PhantomData<fn() -> O>,
}

impl<O> fmt::Debug for InferredSeries<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferredSeries")
            .field("plan", &self.plan)
            .field("pending", &std::any::type_name::<O>())
            .finish()
    }
}

impl Default for InferredSeries<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl InferredSeries<()> {
    /// Creates an empty series. The first step takes no values.
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

impl<O: Values> InferredSeries<O> {
    /// Appends a step whose leading parameters match the pending values.
    pub fn then<F, O2>(self, step: F) -> InferredSeries<O2>
    where
        F: IntoStep<O, O2>,
        O2: Values,
    {
        self.push(None, step)
    }

    /// Appends a step with an explicit name.
    pub fn then_named<F, O2>(self, name: impl Into<StepName>, step: F) -> InferredSeries<O2>
    where
        F: IntoStep<O, O2>,
        O2: Values,
    {
        self.push(Some(name.into()), step)
    }

    fn push<F, O2>(mut self, name: Option<StepName>, step: F) -> InferredSeries<O2>
    where
        F: IntoStep<O, O2>,
        O2: Values,
    {
        self.plan.push(name, move |input: O, next: Next<O2>| {
            <F as IntoStep<O, O2>>::call(step, input, next)
        });
        InferredSeries {
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

/// Creates an empty series with signature-resolved steps.
pub fn inferred_series() -> InferredSeries<()> {
    InferredSeries::new()
}
