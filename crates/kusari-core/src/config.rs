//! Per-series configuration.

use serde::{Deserialize, Serialize};

/// What happens when a step panics while it is being invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanicPolicy {
    /// Catch the panic around every step invocation and deliver it to the
    /// terminal handler as [`SeriesError::Panicked`](crate::SeriesError::Panicked).
    #[default]
    Capture,
    /// Let the panic unwind into whoever invoked the step. The run is
    /// abandoned without calling the terminal handler.
    Propagate,
}

/// Configuration for one series.
///
/// Every field has a default, so partial documents deserialize:
///
/// ```
/// use kusari_core::{PanicPolicy, SeriesConfig};
///
/// let config: SeriesConfig = serde_json::from_str(r#"{ "label": "ingest" }"#)?;
/// assert_eq!(config.label, "ingest");
/// assert_eq!(config.panic_policy, PanicPolicy::Capture);
/// assert!(config.report_abandoned);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesConfig {
    /// Name of the series in log lines.
    pub label: String,
    /// Capture boundary applied uniformly to every step invocation.
    pub panic_policy: PanicPolicy,
    /// Fail the owning step when a continuation is dropped uncalled.
    /// When disabled, such a run stalls and the drop is only logged.
    pub report_abandoned: bool,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            label: "series".to_string(),
            panic_policy: PanicPolicy::Capture,
            report_abandoned: true,
        }
    }
}
