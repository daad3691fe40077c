//! Construction schedule engine: CPM scheduling over a workday calendar and
//! structural validation of activity networks.
//!
//! Exposed to Rust callers directly and to the Python application through
//! the `rust` extension module.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::prelude::*;

pub mod backward_pass;
pub mod calendar;
mod config;
pub mod dependency;
pub mod engine;
pub mod float;
pub mod forward_pass;
pub mod logging;
mod models;
pub mod network;
pub mod validation;

pub use backward_pass::{backward_pass, BackwardPassResult};
pub use calendar::CalendarError;
pub use config::EngineConfig;
pub use dependency::{
    parse_predecessors, parse_predecessors_strict, DependencyError, DependencyType,
    ParsedPredecessor,
};
pub use engine::{schedule, Pass, ScheduleError};
pub use forward_pass::{forward_pass, ForwardPassResult};
pub use models::{activities_from_json, Activity, Schedule, ScheduledActivity, Sentinel};
pub use validation::{
    validate, validate_with_config, ValidationIssue, ValidationIssueKind, ValidationReport,
};

/// Compute early/late dates, total float and criticality for each activity.
///
/// # Arguments
/// * `activities` - List of activities (ids, durations, predecessor strings)
/// * `project_start` - Requested start date; weekends roll forward to Monday
/// * `config` - Engine configuration (defaults when omitted)
///
/// # Returns
/// * Schedule with activities sorted by (early_start, id)
///
/// # Raises
/// * ValueError if a pass fails to converge and `fail_on_non_convergence` is set
/// * ValueError if a lag or duration moves a date outside the supported range
#[pyfunction]
#[pyo3(name = "schedule", signature = (activities, project_start, config=None))]
fn py_schedule(
    activities: Vec<Activity>,
    project_start: NaiveDate,
    config: Option<EngineConfig>,
) -> PyResult<Schedule> {
    let config = config.unwrap_or_default();
    schedule(&activities, project_start, &config)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

/// Check an activity list for missing sentinels, unresolved references,
/// dangling activities and activities unreachable from the start.
///
/// Never raises for structural problems; inspect `report.ok` and
/// `report.errors` instead.
#[pyfunction]
#[pyo3(name = "validate", signature = (activities, config=None))]
fn py_validate(activities: Vec<Activity>, config: Option<EngineConfig>) -> ValidationReport {
    let config = config.unwrap_or_default();
    validate_with_config(&activities, &config)
}

/// Parse a predecessor field such as "4FS,5SS+3".
///
/// # Raises
/// * ValueError listing every malformed token when `strict` is true
#[pyfunction]
#[pyo3(name = "parse_predecessors", signature = (text, strict=false))]
fn py_parse_predecessors(text: &str, strict: bool) -> PyResult<Vec<ParsedPredecessor>> {
    if !strict {
        return Ok(parse_predecessors(text));
    }
    parse_predecessors_strict(text).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        pyo3::exceptions::PyValueError::new_err(messages.join("; "))
    })
}

/// Decode activities from a JSON array or an object with an "activities" key.
#[pyfunction]
#[pyo3(name = "activities_from_json")]
fn py_activities_from_json(text: &str) -> PyResult<Vec<Activity>> {
    activities_from_json(text)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
}

fn calendar_err(e: calendar::CalendarError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

#[pyfunction]
#[pyo3(name = "add_workdays")]
fn py_add_workdays(date: NaiveDate, n: i64) -> PyResult<NaiveDate> {
    calendar::add_workdays(date, n).map_err(calendar_err)
}

#[pyfunction]
#[pyo3(name = "subtract_workdays")]
fn py_subtract_workdays(date: NaiveDate, n: i64) -> PyResult<NaiveDate> {
    calendar::subtract_workdays(date, n).map_err(calendar_err)
}

#[pyfunction]
#[pyo3(name = "count_workdays")]
fn py_count_workdays(start: NaiveDate, end: NaiveDate) -> i64 {
    calendar::count_workdays(start, end)
}

#[pyfunction]
#[pyo3(name = "next_workday")]
fn py_next_workday(date: NaiveDate) -> PyResult<NaiveDate> {
    calendar::next_workday(date).map_err(calendar_err)
}

/// Route engine logs to stderr. `filter` uses RUST_LOG syntax.
#[pyfunction]
#[pyo3(name = "init_logging", signature = (filter=None))]
fn py_init_logging(filter: Option<&str>) {
    logging::init_logging(filter);
}

/// The schedule engine Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Activity>()?;
    m.add_class::<Sentinel>()?;
    m.add_class::<DependencyType>()?;
    m.add_class::<ParsedPredecessor>()?;
    m.add_class::<ScheduledActivity>()?;
    m.add_class::<Schedule>()?;
    m.add_class::<ValidationIssueKind>()?;
    m.add_class::<ValidationIssue>()?;
    m.add_class::<ValidationReport>()?;

    // Config types
    m.add_class::<EngineConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(py_validate, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_predecessors, m)?)?;
    m.add_function(wrap_pyfunction!(py_activities_from_json, m)?)?;

    // Calendar
    m.add_function(wrap_pyfunction!(py_add_workdays, m)?)?;
    m.add_function(wrap_pyfunction!(py_subtract_workdays, m)?)?;
    m.add_function(wrap_pyfunction!(py_count_workdays, m)?)?;
    m.add_function(wrap_pyfunction!(py_next_workday, m)?)?;

    m.add_function(wrap_pyfunction!(py_init_logging, m)?)?;

    Ok(())
}
