use kusari::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("quota exceeded for {0}")]
struct QuotaExceeded(String);

/// Records which steps ran and what the terminal handler received.
#[derive(Clone, Default)]
struct Trace {
    calls: Arc<Mutex<Vec<&'static str>>>,
    outcomes: Arc<Mutex<Vec<Result<(), SeriesError>>>>,
    terminal_calls: Arc<AtomicUsize>,
}

impl Trace {
    fn hit(&self, name: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(name);
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn terminal(&self) -> impl FnOnce(Result<(), SeriesError>) + Send + 'static {
        let (outcomes, count) = (self.outcomes.clone(), self.terminal_calls.clone());
        move |outcome| {
            count.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut outcomes) = outcomes.lock() {
                outcomes.push(outcome);
            }
        }
    }

    /// Takes the first recorded outcome.
    fn outcome(&self) -> Option<Result<(), SeriesError>> {
        let mut outcomes = self.outcomes.lock().ok()?;
        if outcomes.is_empty() {
            None
        } else {
            Some(outcomes.remove(0))
        }
    }
}

#[test]
fn test_simple_series_no_error() {
    let trace = Trace::default();
    let (t1, t2, t3) = (trace.clone(), trace.clone(), trace.clone());

    simple_series()
        .then(move |next: Done| {
            t1.hit("first");
            next.done();
        })
        .then(move |next: Done| {
            t2.hit("second");
            next.done();
        })
        .then(move |next: Done| {
            t3.hit("third");
            next.done();
        })
        .run(trace.terminal());

    assert_eq!(trace.calls(), vec!["first", "second", "third"]);
    assert!(matches!(trace.outcome(), Some(Ok(()))));
    assert_eq!(trace.terminal_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_simple_series_with_error() {
    let trace = Trace::default();
    let (t1, t2, t3) = (trace.clone(), trace.clone(), trace.clone());

    simple_series()
        .then(move |next: Done| {
            t1.hit("first");
            next.done();
        })
        .then(move |next: Done| {
            t2.hit("second");
            next.fail(QuotaExceeded("uploads".to_string()));
        })
        .then(move |next: Done| {
            t3.hit("third");
            next.done();
        })
        .run(trace.terminal());

    assert_eq!(trace.calls(), vec!["first", "second"]);
    let outcome = trace.outcome();
    let error = outcome.as_ref().and_then(|o| o.as_ref().err());
    assert_eq!(
        error.and_then(|e| e.downcast_source::<QuotaExceeded>()),
        Some(&QuotaExceeded("uploads".to_string()))
    );
    assert_eq!(
        error.and_then(SeriesError::step_name).map(StepName::as_str),
        Some("step-2")
    );
    assert_eq!(trace.terminal_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_series_with_parameters() {
    let trace = Trace::default();
    let seen = Arc::new(Mutex::new((0, 0, 0)));
    let (s2, s3) = (seen.clone(), seen.clone());
    let (t1, t2, t3) = (trace.clone(), trace.clone(), trace.clone());

    series()
        .then(move |(): (), next: Next<(i32,)>| {
            t1.hit("first");
            next.ok((1,));
        })
        .then(move |(x,): (i32,), next: Next<(i32, i32)>| {
            t2.hit("second");
            if let Ok(mut seen) = s2.lock() {
                seen.0 = x;
            }
            next.ok((2, 3));
        })
        .then(move |(x1, x2): (i32, i32), next: Next<()>| {
            t3.hit("third");
            if let Ok(mut seen) = s3.lock() {
                seen.1 = x1;
                seen.2 = x2;
            }
            next.ok(());
        })
        .run(trace.terminal());

    assert_eq!(trace.calls(), vec!["first", "second", "third"]);
    assert!(matches!(trace.outcome(), Some(Ok(()))));
    assert_eq!(seen.lock().map(|s| *s).unwrap_or_default(), (1, 2, 3));
}

#[test]
fn test_series_error_at_every_position() {
    for failing in 0..4usize {
        let trace = Trace::default();
        let invoked = Arc::new(AtomicUsize::new(0));
        let mut steps: Vec<BoxedStep> = Vec::new();
        for position in 0..4usize {
            let invoked = invoked.clone();
            steps.push(Box::new(move |next: Done| {
                invoked.fetch_add(1, Ordering::SeqCst);
                if position == failing {
                    next.fail(format!("step {position} failed"));
                } else {
                    next.done();
                }
            }));
        }

        SimpleSeries::from_steps(steps).run(trace.terminal());

        assert_eq!(invoked.load(Ordering::SeqCst), failing + 1);
        let message = trace
            .outcome()
            .and_then(|o| o.err())
            .map(|e| e.to_string());
        assert_eq!(
            message,
            Some(format!(
                "Step failed: step-{}, details: step {} failed",
                failing + 1,
                failing
            ))
        );
        assert_eq!(trace.terminal_calls.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_inferred_series_with_parameters() {
    let trace = Trace::default();
    let (tx, rx) = mpsc::channel();

    inferred_series()
        .then(|next: Next<(i32,)>| next.ok((1,)))
        .then(|x: i32, next: Next<(i32, i32)>| next.ok((x + 1, x + 2)))
        .then(move |x1: i32, x2: i32, next: Next<()>| {
            let _ = tx.send((x1, x2));
            next.ok(());
        })
        .run(trace.terminal());

    assert_eq!(rx.try_recv().ok(), Some((2, 3)));
    assert!(matches!(trace.outcome(), Some(Ok(()))));
}

#[test]
fn test_panic_in_first_step_is_captured() {
    let trace = Trace::default();
    let later = trace.clone();

    simple_series()
        .then_named("explode", |_next: Done| {
            let values: Vec<u8> = Vec::new();
            let fourth = values[3];
            drop(fourth);
        })
        .then(move |next: Done| {
            later.hit("after panic");
            next.done();
        })
        .run(trace.terminal());

    assert!(trace.calls().is_empty());
    let outcome = trace.outcome();
    assert!(matches!(
        outcome,
        Some(Err(SeriesError::Panicked { ref step, .. })) if step.as_str() == "explode"
    ));
    assert_eq!(trace.terminal_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_panic_after_calling_continuation_skips_later_steps() {
    let trace = Trace::default();
    let seen = trace.clone();

    series()
        .then_named("late-panic", |(): (), next: Next<()>| {
            next.ok(());
            std::panic::panic_any("too late");
        })
        .then(move |(): (), next: Next<()>| {
            seen.hit("second");
            next.ok(());
        })
        .run(trace.terminal());

    assert!(trace.calls().is_empty());
    assert!(matches!(
        trace.outcome(),
        Some(Err(SeriesError::Panicked { ref step, ref message }))
            if step.as_str() == "late-panic" && message == "too late"
    ));
    assert_eq!(trace.terminal_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_propagate_policy_lets_panic_escape() {
    let trace = Trace::default();
    let terminal = trace.terminal();

    let escaped = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        simple_series()
            .with_panic_policy(PanicPolicy::Propagate)
            .then(|_next: Done| std::panic::panic_any("escape"))
            .run(terminal);
    }));

    assert!(escaped.is_err());
    assert_eq!(trace.terminal_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_terminal_panic_escapes_however_the_run_ends() {
    fn escapes(series: SimpleSeries) -> Option<String> {
        let escaped = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            series.run(|_outcome| std::panic::panic_any("terminal panicked"));
        }));
        escaped
            .err()
            .and_then(|payload| payload.downcast_ref::<&str>().map(|m| m.to_string()))
    }

    let expected = Some("terminal panicked".to_string());
    assert_eq!(escapes(simple_series().then(|next: Done| next.done())), expected);
    assert_eq!(escapes(simple_series().then(|next: Done| next.fail("boom"))), expected);
    assert_eq!(escapes(simple_series().then(|next: Done| drop(next))), expected);
    assert_eq!(
        escapes(simple_series().then(|_next: Done| std::panic::panic_any("step"))),
        expected
    );
}

#[test]
fn test_dropped_continuation_reports_abandonment() {
    let trace = Trace::default();
    let later = trace.clone();

    inferred_series()
        .then_named("forgetful", |next: Next<(u8,)>| drop(next))
        .then(move |_n: u8, next: Next<()>| {
            later.hit("unreachable");
            next.ok(());
        })
        .run(trace.terminal());

    assert!(trace.calls().is_empty());
    assert!(matches!(
        trace.outcome(),
        Some(Err(SeriesError::Abandoned { ref step })) if step.as_str() == "forgetful"
    ));
}

#[test]
fn test_config_from_document() {
    let config: SeriesConfig =
        serde_json::from_str(r#"{ "label": "import", "report_abandoned": false }"#)
            .unwrap_or_default();
    let trace = Trace::default();

    simple_series()
        .with_config(config)
        .then(|next: Done| drop(next))
        .run(trace.terminal());

    // The run stalled: nothing settled it.
    assert!(trace.outcome().is_none());
    assert_eq!(trace.terminal_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_long_synchronous_series() {
    let trace = Trace::default();
    let counter = Arc::new(AtomicUsize::new(0));
    let mut series = simple_series();
    for _ in 0..10_000 {
        let counter = counter.clone();
        series = series.then(move |next: Done| {
            counter.fetch_add(1, Ordering::SeqCst);
            next.done();
        });
    }

    series.run(trace.terminal());

    assert_eq!(counter.load(Ordering::SeqCst), 10_000);
    assert!(matches!(trace.outcome(), Some(Ok(()))));
}
