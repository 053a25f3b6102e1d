//! Series error types.

use crate::step::StepName;
use thiserror::Error;

/// The opaque error a step reports through its continuation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The outcome delivered to a terminal handler when a series run fails.
///
/// Whatever went wrong, the terminal handler receives exactly one of these
/// per run and no step after the failing one is invoked.
///
/// # Non-Exhaustive
///
/// Always include a wildcard arm when matching:
///
/// ```
/// use kusari_core::SeriesError;
///
/// fn describe(error: &SeriesError) -> String {
///     match error {
///         SeriesError::Step { step, source } => format!("{step} failed: {source}"),
///         SeriesError::Panicked { step, message } => format!("{step} panicked: {message}"),
///         _ => error.to_string(),
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SeriesError {
    /// A step passed an error to its continuation.
    #[error("Step failed: {step}, details: {source}")]
    Step {
        /// The step that reported the error.
        step: StepName,
        /// The error exactly as the step reported it.
        source: BoxError,
    },

    /// A step panicked while it was being invoked and the panic was
    /// captured.
    #[error("Step panicked: {step}, details: {message}")]
    Panicked {
        /// The step whose invocation panicked.
        step: StepName,
        /// The panic payload, if it was a string.
        message: String,
    },

    /// A step dropped its continuation without calling it.
    #[error("Continuation dropped without being called in step: {step}")]
    Abandoned {
        /// The step that dropped its continuation.
        step: StepName,
    },

    /// The values reaching a step did not have the type it was built for.
    #[error("Value mismatch entering step '{step}': expected {expected}")]
    ValueMismatch {
        /// The step that could not accept the values.
        step: StepName,
        /// Type name of the tuple the step expected.
        expected: &'static str,
    },

    /// The run was dropped before its terminal handler was reached.
    #[error("Series dropped before reaching its terminal handler")]
    Unsettled,
}

impl SeriesError {
    /// Returns the name of the step the error is attributed to, if any.
    pub fn step_name(&self) -> Option<&StepName> {
        match self {
            SeriesError::Step { step, .. }
            | SeriesError::Panicked { step, .. }
            | SeriesError::Abandoned { step }
            | SeriesError::ValueMismatch { step, .. } => Some(step),
            SeriesError::Unsettled => None,
        }
    }

    /// Downcasts the error a step reported to a concrete type.
    ///
    /// Returns `None` for every variant except [`SeriesError::Step`], or when
    /// the reported error is of another type.
    pub fn downcast_source<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            SeriesError::Step { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns `true` if a captured panic caused the failure.
    pub fn is_panic(&self) -> bool {
        matches!(self, SeriesError::Panicked { .. })
    }
}
