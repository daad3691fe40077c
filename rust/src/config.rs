//! Configuration for the schedule engine.

use pyo3::prelude::*;

/// Engine configuration shared by scheduling and validation.
#[pyclass]
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Return an error instead of a partial schedule when a pass hits its iteration cap.
    #[pyo3(get, set)]
    pub fail_on_non_convergence: bool,
    /// Name substring identifying the start sentinel (case-insensitive).
    #[pyo3(get, set)]
    pub start_marker: String,
    /// Name substring identifying the end sentinel (case-insensitive).
    #[pyo3(get, set)]
    pub end_marker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            fail_on_non_convergence: false,
            start_marker: "project start".to_string(),
            end_marker: "project end".to_string(),
        }
    }
}

#[pymethods]
impl EngineConfig {
    #[new]
    #[pyo3(signature = (
        verbosity=None,
        fail_on_non_convergence=None,
        start_marker=None,
        end_marker=None
    ))]
    fn new(
        verbosity: Option<u8>,
        fail_on_non_convergence: Option<bool>,
        start_marker: Option<String>,
        end_marker: Option<String>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
            fail_on_non_convergence: fail_on_non_convergence
                .unwrap_or(defaults.fail_on_non_convergence),
            start_marker: start_marker.unwrap_or(defaults.start_marker),
            end_marker: end_marker.unwrap_or(defaults.end_marker),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "EngineConfig(verbosity={}, fail_on_non_convergence={}, start_marker={:?}, end_marker={:?})",
            self.verbosity, self.fail_on_non_convergence, self.start_marker, self.end_marker
        )
    }
}
