//! Value-free series: every step shares the signature `FnOnce(Done)`.

use crate::engine::Plan;
use kusari_core::{Done, PanicPolicy, SeriesConfig, SeriesError, StepInfo, StepName};

/// A boxed value-free step, for building a series from a list.
pub type BoxedStep = Box<dyn FnOnce(Done) + Send>;

/// A series whose steps forward no values.
///
/// Each step receives only a [`Done`] continuation. Success runs the next
/// step; failure goes straight to the terminal handler.
///
/// # Examples
///
/// ```
/// use kusari::prelude::*;
/// use std::sync::mpsc;
///
/// let (tx, rx) = mpsc::channel();
///
/// simple_series()
///     .then(|next: Done| next.done())
///     .then(|next: Done| next.fail("disk full"))
///     .then(|_next: Done| unreachable!("skipped after a failure"))
///     .run(move |outcome| tx.send(outcome.is_err()).unwrap_or(()));
///
/// assert_eq!(rx.recv().ok(), Some(true));
/// ```
#[derive(Debug)]
pub struct SimpleSeries {
    plan: Plan,
}

impl Default for SimpleSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleSeries {
    /// Creates an empty series.
    pub fn new() -> Self {
        Self { plan: Plan::new() }
    }

    /// Creates a series from an ordered list of steps.
    pub fn from_steps<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = BoxedStep>,
    {
        steps.into_iter().fold(Self::new(), |series, step| series.then(step))
    }

    /// Appends a step.
    pub fn then<F>(self, step: F) -> Self
    where
        F: FnOnce(Done) + Send + 'static,
    {
        self.push(None, step)
    }

    /// Appends a step with an explicit name.
    pub fn then_named<F>(self, name: impl Into<StepName>, step: F) -> Self
    where
        F: FnOnce(Done) + Send + 'static,
    {
        self.push(Some(name.into()), step)
    }

    fn push<F>(mut self, name: Option<StepName>, step: F) -> Self
    where
        F: FnOnce(Done) + Send + 'static,
    {
        self.plan.push(name, move |(): (), next: Done| step(next));
        self
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

    /// Returns the steps in order.
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

/// Creates an empty value-free series.
pub fn simple_series() -> SimpleSeries {
    SimpleSeries::new()
}
