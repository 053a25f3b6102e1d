//! Interop with the tokio runtime.
//!
//! The orchestrator never schedules anything. These helpers let a series
//! be awaited and let `async fn` steps run on the caller's runtime.

use crate::engine::Plan;
use kusari_core::{AsyncStep, Next, SeriesError, Values};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Starts the plan and resolves with the outcome its terminal handler
/// receives, or [`SeriesError::Unsettled`] if the run is dropped first.
pub(crate) async fn settle(plan: Plan) -> Result<(), SeriesError> {
    let (tx, rx) = oneshot::channel();
    plan.start(Box::new(move |outcome| {
        if tx.send(outcome).is_err() {
            debug!("Series outcome dropped, nobody is awaiting it");
        }
    }));
    rx.await.unwrap_or(Err(SeriesError::Unsettled))
}

/// Adapts an [`AsyncStep`] into a step for [`Series`](crate::Series).
///
/// When the step is invoked its future is spawned on the tokio runtime
/// current at that moment, and the continuation is called once the future
/// resolves. With no runtime available the step fails immediately.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use kusari::prelude::*;
///
/// struct Double;
///
/// #[async_trait]
/// impl AsyncStep<(u32,)> for Double {
///     type Output = (u32,);
///
///     async fn execute(&self, (n,): (u32,)) -> Result<(u32,), BoxError> {
///         Ok((n * 2,))
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let outcome = series()
///     .then(|(): (), next: Next<(u32,)>| next.ok((21,)))
///     .then(bridge::spawn(Double))
///     .then(|(n,): (u32,), next: Next<()>| {
///         if n == 42 { next.ok(()) } else { next.fail("wrong answer") }
///     })
///     .run_async()
///     .await;
/// assert!(outcome.is_ok());
/// # }
/// ```
pub fn spawn<S, In>(step: S) -> impl FnOnce(In, Next<S::Output>) + Send + 'static
where
    S: AsyncStep<In>,
    In: Values,
{
    move |input: In, next: Next<S::Output>| {
        let name = step.name();
        match Handle::try_current() {
            Ok(handle) => {
                debug!("Spawning async step '{}'", name);
                let _task = handle.spawn(async move {
                    let outcome = step.execute(input).await;
                    next.call(outcome);
                });
            }
            Err(_) => {
                warn!("No tokio runtime to run async step '{}'", name);
                next.fail(format!("no tokio runtime available for async step '{name}'"));
            }
        }
    }
}
