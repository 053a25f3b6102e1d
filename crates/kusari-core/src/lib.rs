//! Core contracts for the kusari series combinators.
//!
//! This crate has no runtime dependencies. It defines what a step and its
//! continuation are; the `kusari` crate wires them into series.
//!
//! # Core Types
//!
//! - [`Next`] / [`Done`] - The one-shot continuation a step must call
//! - [`Values`] - A value tuple crossing a step boundary
//! - [`IntoStep`] - Resolves a closure's inputs and outputs from its parameters
//! - [`SeriesError`] - The failure delivered to a terminal handler
//! - [`SeriesConfig`] - Label, panic capture policy, abandonment reporting
//!
//! # Optional Traits
//!
//! - [`AsyncStep`] - A step written as an `async fn`

mod config;
mod error;
mod next;
mod resolve;
mod step;
mod traits;

pub use config::{PanicPolicy, SeriesConfig};
pub use error::{BoxError, SeriesError};
pub use next::{Done, Next, Pending, Resume};
pub use resolve::{IntoStep, Values};
pub use step::{StepInfo, StepName};
pub use traits::AsyncStep;
