//! CPM engine: forward pass, backward pass, float classification.

use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::backward_pass::backward_pass;
use crate::calendar::{next_workday, CalendarError};
use crate::config::EngineConfig;
use crate::float::classify;
use crate::forward_pass::forward_pass;
use crate::log_changes;
use crate::models::{Activity, Schedule};
use crate::network::ActivityNetwork;

/// Which propagation pass an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Forward,
    Backward,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Forward => write!(f, "forward"),
            Pass::Backward => write!(f, "backward"),
        }
    }
}

/// Errors that can occur during scheduling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("{pass} pass did not converge after {iterations} iterations (dependency cycle?)")]
    NonConvergence { pass: Pass, iterations: usize },

    #[error("project start cannot be moved to a workday: {source}")]
    ProjectStart {
        #[source]
        source: CalendarError,
    },

    #[error("{pass} pass: date of activity {activity_id} is out of range: {source}")]
    DateOutOfRange {
        pass: Pass,
        activity_id: u32,
        #[source]
        source: CalendarError,
    },
}

/// Schedule `activities` from `project_start`.
///
/// The start date is moved to the next workday when it falls on a weekend.
/// Structure is not checked here: unknown predecessor ids are ignored and
/// unreachable activities simply start at the project start. Run
/// [`crate::validation::validate`] first when the input is untrusted.
///
/// A pass that exhausts its iteration budget is logged and its partial
/// result kept, unless `config.fail_on_non_convergence` is set. Lags or
/// durations that push a date past what `NaiveDate` can hold always fail.
pub fn schedule(
    activities: &[Activity],
    project_start: NaiveDate,
    config: &EngineConfig,
) -> Result<Schedule, ScheduleError> {
    let verbosity = config.verbosity;
    let project_start =
        next_workday(project_start).map_err(|source| ScheduleError::ProjectStart { source })?;
    let network = ActivityNetwork::new(activities);

    let forward = forward_pass(&network, project_start, verbosity)?;
    if !forward.converged && config.fail_on_non_convergence {
        return Err(ScheduleError::NonConvergence {
            pass: Pass::Forward,
            iterations: forward.iterations,
        });
    }

    let project_end = forward
        .early_finish
        .iter()
        .copied()
        .max()
        .unwrap_or(project_start);
    log_changes!(
        verbosity,
        "forward pass done in {} iterations; project end {}",
        forward.iterations,
        project_end
    );

    let backward = backward_pass(&network, project_end, verbosity)?;
    if !backward.converged && config.fail_on_non_convergence {
        return Err(ScheduleError::NonConvergence {
            pass: Pass::Backward,
            iterations: backward.iterations,
        });
    }
    log_changes!(
        verbosity,
        "backward pass done in {} iterations",
        backward.iterations
    );

    Ok(Schedule {
        activities: classify(activities, &forward, &backward),
        project_start,
        project_end,
        forward_converged: forward.converged,
        backward_converged: backward.converged,
    })
}
