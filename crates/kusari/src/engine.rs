//! Series orchestration.
//!
//! A [`Plan`] is the list of type-erased steps a builder produced. Starting
//! it creates a `Run`: the position of the next step, the values waiting for
//! it and the terminal handler. Each continuation resumes the run one
//! position further on success, or settles the terminal handler on failure.

use kusari_core::{
    BoxError, Next, PanicPolicy, Pending, Resume, SeriesConfig, SeriesError, StepInfo, StepName,
    Values,
};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Instant;
use tracing::{debug, info, warn};

/// The single exit point of a series run.
pub(crate) type Terminal = Box<dyn FnOnce(Result<(), SeriesError>) + Send>;

type ErasedStep = Box<dyn FnOnce(Pending, Arc<dyn Resume>, usize) -> Result<(), Mismatch> + Send>;

/// Values arrived at a step with a type other than the one it was built for.
struct Mismatch {
    expected: &'static str,
}

/// Steps and configuration of a series that has not started yet.
pub(crate) struct Plan {
    steps: Vec<ErasedStep>,
    infos: Vec<StepInfo>,
    config: SeriesConfig,
}

impl fmt::Debug for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("label", &self.config.label)
            .field(
                "steps",
                &self.infos.iter().map(ToString::to_string).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Plan {
    pub(crate) fn new() -> Self {
        Self {
            steps: Vec::new(),
            infos: Vec::new(),
            config: SeriesConfig::default(),
        }
    }

    /// Appends a step consuming `I` and forwarding `O`.
    pub(crate) fn push<I, O, F>(&mut self, name: Option<StepName>, step: F)
    where
        I: Values,
        O: Values,
        F: FnOnce(I, Next<O>) + Send + 'static,
    {
        let position = self.steps.len();
        let info = StepInfo {
            name: name.unwrap_or_else(|| StepName::at(position)),
            position,
            inputs: I::type_names(),
            outputs: O::type_names(),
        };
        debug!("Series '{}' resolved {}", self.config.label, info);
        self.infos.push(info);
        self.steps.push(Box::new(
            move |pending: Pending, run: Arc<dyn Resume>, position: usize| -> Result<(), Mismatch> {
                let input = pending.downcast::<I>().map_err(|_| Mismatch {
                    expected: std::any::type_name::<I>(),
                })?;
                step(*input, Next::new(run, position));
                Ok(())
            },
        ));
    }

    pub(crate) fn infos(&self) -> &[StepInfo] {
        &self.infos
    }

    pub(crate) fn config(&self) -> &SeriesConfig {
        &self.config
    }

    pub(crate) fn config_mut(&mut self) -> &mut SeriesConfig {
        &mut self.config
    }

    /// Starts the run. Returns once the series settles or a step defers
    /// its continuation.
    pub(crate) fn start(self, terminal: Terminal) {
        let Plan {
            steps,
            infos,
            config,
        } = self;
        debug!(
            "Series '{}' starting with {} steps",
            config.label,
            infos.len()
        );
        let run = Arc::new(Run {
            steps: Mutex::new(steps.into_iter().map(Some).collect()),
            infos,
            terminal: Mutex::new(Some(terminal)),
            config,
            started_at: Instant::now(),
            driver: Mutex::new(Driver::default()),
        });
        run.drive(Work::Invoke(0, Box::new(())));
    }
}

/// Transient state of one series run, shared by the continuations of its
/// steps.
struct Run {
    steps: Mutex<Vec<Option<ErasedStep>>>,
    infos: Vec<StepInfo>,
    terminal: Mutex<Option<Terminal>>,
    config: SeriesConfig,
    started_at: Instant,
    driver: Mutex<Driver>,
}

/// Whether some thread is currently driving the run, the step it is
/// invoking, and the work that arrived meanwhile.
#[derive(Default)]
struct Driver {
    active: bool,
    invoking: Option<(ThreadId, usize)>,
    queued: Option<Work>,
}

/// What the driving loop does next.
enum Work {
    /// Invoke the step at this position with its predecessor's values.
    Invoke(usize, Pending),
    /// Hand the outcome to the terminal handler.
    Settle(Result<(), SeriesError>),
}

impl Run {
    fn name_at(&self, position: usize) -> StepName {
        self.infos
            .get(position)
            .map(|info| info.name.clone())
            .unwrap_or_else(|| StepName::at(position))
    }

    fn is_settled(&self) -> bool {
        self.terminal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn take_step(&self, position: usize) -> Option<ErasedStep> {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(position)
            .and_then(Option::take)
    }

    fn driver(&self) -> MutexGuard<'_, Driver> {
        self.driver.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `work` and whatever it queues, until a step defers its
    /// continuation or the run settles.
    ///
    /// A continuation called while a step is still being invoked is queued
    /// and picked up by the driving loop once that step returns, so
    /// synchronous series run iteratively, never two steps at once, and the
    /// terminal handler is always called outside the capture boundary.
    fn drive(self: &Arc<Self>, work: Work) {
        {
            let mut driver = self.driver();
            if driver.active {
                // Each continuation is one-shot and the next one only exists
                // once its step is invoked, so at most one item waits here.
                debug_assert!(driver.queued.is_none(), "driver slot already taken");
                driver.queued = Some(work);
                return;
            }
            driver.active = true;
        }

        let mut next = Some(work);
        while let Some(work) = next {
            match work {
                Work::Invoke(position, values) => self.invoke(position, values),
                Work::Settle(outcome) => self.finish(outcome),
            }
            let mut driver = self.driver();
            next = driver.queued.take();
            if next.is_none() {
                driver.active = false;
            }
        }
    }

    /// `true` while this thread is invoking the step at `position` inside
    /// the capture boundary.
    fn is_capturing(&self, position: usize) -> bool {
        self.config.panic_policy == PanicPolicy::Capture
            && self.driver().invoking == Some((thread::current().id(), position))
    }

    /// Invokes the step at `position` with the values its predecessor
    /// forwarded, or settles the run when no steps remain.
    fn invoke(self: &Arc<Self>, position: usize, values: Pending) {
        if self.is_settled() {
            warn!(
                "Series '{}' already settled, not invoking {}",
                self.config.label,
                self.name_at(position)
            );
            return;
        }

        if position >= self.infos.len() {
            if values.downcast_ref::<()>().is_some() {
                self.finish(Ok(()));
            } else {
                self.finish(Err(SeriesError::ValueMismatch {
                    step: StepName::new("terminal"),
                    expected: std::any::type_name::<()>(),
                }));
            }
            return;
        }

        let Some(step) = self.take_step(position) else {
            warn!(
                "Series '{}' step {} was already invoked",
                self.config.label,
                self.name_at(position)
            );
            return;
        };

        debug!(
            "Series '{}' invoking step {}/{}: {}",
            self.config.label,
            position + 1,
            self.infos.len(),
            self.name_at(position)
        );

        let resume: Arc<dyn Resume> = self.clone();
        self.driver().invoking = Some((thread::current().id(), position));
        let invoked = match self.config.panic_policy {
            PanicPolicy::Capture => catch_unwind(AssertUnwindSafe(|| step(values, resume, position))),
            PanicPolicy::Propagate => Ok(step(values, resume, position)),
        };
        self.driver().invoking = None;

        match invoked {
            Ok(Ok(())) => {}
            Ok(Err(mismatch)) => self.finish(Err(SeriesError::ValueMismatch {
                step: self.name_at(position),
                expected: mismatch.expected,
            })),
            Err(payload) => {
                let message = panic_message(&*payload);
                warn!(
                    "Series '{}' step '{}' panicked: {}",
                    self.config.label,
                    self.name_at(position),
                    message
                );
                self.finish(Err(SeriesError::Panicked {
                    step: self.name_at(position),
                    message,
                }));
            }
        }
    }

    /// Hands the outcome to the terminal handler if nothing settled the run
    /// before.
    fn finish(&self, outcome: Result<(), SeriesError>) {
        let terminal = self
            .terminal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(terminal) = terminal else {
            if let Err(e) = &outcome {
                warn!(
                    "Series '{}' already settled, dropping late failure: {}",
                    self.config.label, e
                );
            }
            return;
        };

        // Release whatever the skipped steps captured.
        let skipped = std::mem::take(&mut *self.steps.lock().unwrap_or_else(PoisonError::into_inner));
        drop(skipped);

        match &outcome {
            Ok(()) => info!(
                "Series '{}' completed {} steps in {:?}",
                self.config.label,
                self.infos.len(),
                self.started_at.elapsed()
            ),
            Err(e) => warn!("Series '{}' failed: {}", self.config.label, e),
        }
        terminal(outcome);
    }
}

impl Resume for Run {
    fn resume(self: Arc<Self>, position: usize, outcome: Result<Pending, BoxError>) {
        match outcome {
            Ok(values) => {
                debug!(
                    "Series '{}' step '{}' completed",
                    self.config.label,
                    self.name_at(position)
                );
                self.drive(Work::Invoke(position + 1, values));
            }
            Err(source) => {
                let step = self.name_at(position);
                self.drive(Work::Settle(Err(SeriesError::Step { step, source })));
            }
        }
    }

    fn abandon(self: Arc<Self>, position: usize) {
        let step = self.name_at(position);
        if thread::panicking() && self.is_capturing(position) {
            debug!(
                "Series '{}' step '{}' unwinding, panic is reported instead",
                self.config.label, step
            );
            return;
        }
        if self.config.report_abandoned {
            self.drive(Work::Settle(Err(SeriesError::Abandoned { step })));
        } else {
            warn!(
                "Series '{}' step '{}' dropped its continuation, run stalls",
                self.config.label, step
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
