//! Step identity and resolved signatures.

use std::fmt;

/// Name of a step, as it appears in errors and log lines.
///
/// Steps added without an explicit name are called after their position.
///
/// # Examples
///
/// ```
/// use kusari_core::StepName;
///
/// let name = StepName::new("fetch");
/// assert_eq!(name.as_str(), "fetch");
///
/// assert_eq!(StepName::at(0).as_str(), "step-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepName(String);

impl StepName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Positional name for the zero-based `position`: `step-1`, `step-2`...
    pub fn at(position: usize) -> Self {
        Self(format!("step-{}", position + 1))
    }

    /// Last path segment of `T`'s type name, generics stripped.
    pub fn from_type_name<T: ?Sized>() -> Self {
        let full_name = std::any::type_name::<T>();
        let base = full_name.split('<').next().unwrap_or(full_name);
        Self::new(base.rsplit("::").next().unwrap_or(base))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for StepName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for StepName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::borrow::Borrow<str> for StepName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

/// A step's place in a series together with the value types it consumes
/// and produces, as resolved when the step was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInfo {
    /// Name used in errors and logs.
    pub name: StepName,
    /// Zero-based index in the series.
    pub position: usize,
    /// Type names of the values the step receives, in order.
    pub inputs: Vec<&'static str>,
    /// Type names of the values the step forwards, in order.
    pub outputs: Vec<&'static str>,
}

impl StepInfo {
    /// Number of values flowing into the step.
    pub fn input_arity(&self) -> usize {
        self.inputs.len()
    }

    /// Number of values flowing out of the step.
    pub fn output_arity(&self) -> usize {
        self.outputs.len()
    }
}

impl fmt::Display for StepInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: ({}) -> ({})",
            self.name,
            self.inputs.join(", "),
            self.outputs.join(", ")
        )
    }
}
