//! Optional step traits.

use crate::error::BoxError;
use crate::resolve::Values;
use crate::step::StepName;
use async_trait::async_trait;

/// A step written as an `async fn` instead of a callback.
///
/// The orchestrator itself only knows callbacks; `kusari::bridge::spawn`
/// turns an `AsyncStep` into one by running it on a tokio runtime and
/// calling the continuation with its result.
///
/// # Examples
///
/// ```
/// use kusari_core::{AsyncStep, BoxError};
/// use async_trait::async_trait;
///
/// struct Lookup;
///
/// #[async_trait]
/// impl AsyncStep<(u64,)> for Lookup {
///     type Output = (String,);
///
///     async fn execute(&self, (id,): (u64,)) -> Result<(String,), BoxError> {
///         Ok((format!("user-{id}"),))
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncStep<In: Values>: Send + Sync + 'static {
    /// Values forwarded to the next step on success.
    type Output: Values;

    /// Runs the step to completion.
    async fn execute(&self, input: In) -> Result<Self::Output, BoxError>;

    /// Returns the step name. Defaults to the type name.
    fn name(&self) -> StepName {
        StepName::from_type_name::<Self>()
    }
}
