//! # Kusari (鎖)
//!
//! Sequence callback-based asynchronous steps without an event loop of
//! its own.
//!
//! A series is an ordered list of steps plus one terminal handler. Each
//! step does some work and eventually calls its continuation ([`Next`]),
//! either with an error or with the values the next step expects. The
//! next step runs only after that; the first error skips every remaining
//! step and goes straight to the terminal handler, which runs exactly once
//! per run.
//!
//! ## Three ways to build a series
//!
//! - [`SimpleSeries`] - steps forward nothing, only success or failure
//! - [`Series`] - steps receive their predecessor's values as one tuple
//! - [`InferredSeries`] - inputs and outputs are read off each closure's
//!   parameter list
//!
//! In the typed variants, a step that does not accept exactly what its
//! predecessor forwards is a compile error, and so is running a series
//! that still has values pending.
//!
//! ## Quick Start
//!
//! ```rust
//! use kusari::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let outcome = inferred_series()
//!     .then(|next: Next<(i32,)>| next.ok((1,)))
//!     .then(|x: i32, next: Next<(i32, i32)>| next.ok((x * 2, x * 3)))
//!     .then(|a: i32, b: i32, next: Next<()>| {
//!         if a + b == 5 { next.ok(()) } else { next.fail("bad sum") }
//!     })
//!     .run_async()
//!     .await;
//!
//! assert!(outcome.is_ok());
//! # }
//! ```
//!
//! ## Asynchronous Completion
//!
//! A step may call its continuation later, from any thread:
//!
//! ```rust
//! use kusari::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let outcome = simple_series()
//!     .then(|next: Done| {
//!         tokio::spawn(async move {
//!             tokio::time::sleep(Duration::from_millis(5)).await;
//!             next.done();
//!         });
//!     })
//!     .then(|next: Done| next.done())
//!     .run_async()
//!     .await;
//!
//! assert!(outcome.is_ok());
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use kusari::prelude::*;
//!
//! simple_series()
//!     .then(|next: Done| next.fail("connection refused"))
//!     .run(|outcome| match outcome {
//!         Ok(()) => println!("all steps succeeded"),
//!         Err(SeriesError::Step { step, source }) => eprintln!("{step} failed: {source}"),
//!         Err(SeriesError::Panicked { step, message }) => eprintln!("{step} panicked: {message}"),
//!         Err(error) => eprintln!("series failed: {error}"),
//!     });
//! ```
//!
//! A panic raised while a step is invoked is captured and delivered the
//! same way, unless the series is built with [`PanicPolicy::Propagate`].

mod engine;
mod inferred;
mod series;
mod simple;

pub mod bridge;

// Re-export core types
pub use kusari_core::*;

pub use inferred::{inferred_series, InferredSeries};
pub use series::{series, Series};
pub use simple::{simple_series, BoxedStep, SimpleSeries};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::bridge;
    pub use crate::{
        inferred_series, series, simple_series, AsyncStep, BoxError, BoxedStep, Done,
        InferredSeries, Next, PanicPolicy, Series, SeriesConfig, SeriesError, SimpleSeries,
        StepInfo, StepName,
    };
}
