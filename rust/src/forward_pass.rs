//! Forward pass: earliest start and finish dates.
//!
//! Dates are relaxed to a fixed point rather than visited in topological
//! order, so the pass tolerates (and does not detect) cycles or disconnected
//! activities. A pass that keeps changing after N^2 sweeps is reported as
//! not converged and its partial dates are returned.

use chrono::NaiveDate;

use crate::calendar::{add_workdays, finish_date, shift_workdays, start_date, CalendarError};
use crate::dependency::DependencyType;
use crate::engine::{Pass, ScheduleError};
use crate::network::{ActivityNetwork, Edge};
use crate::{log_changes, log_checks, log_debug};

/// Result of the forward pass, indexed like the activity slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPassResult {
    pub early_start: Vec<NaiveDate>,
    pub early_finish: Vec<NaiveDate>,
    /// Full sweeps performed, including the final one that changed nothing.
    pub iterations: usize,
    pub converged: bool,
}

/// Earliest start a successor may take given one predecessor edge.
///
/// SF is evaluated exactly like FS. A zero-duration predecessor lets its FS
/// successor start on the same day it finishes.
pub fn successor_early_start(
    edge: &Edge,
    pred_early_start: NaiveDate,
    pred_early_finish: NaiveDate,
    pred_duration: u32,
    succ_duration: u32,
) -> Result<NaiveDate, CalendarError> {
    match edge.dep_type {
        DependencyType::FS | DependencyType::SF => {
            let base = if pred_duration == 0 {
                pred_early_finish
            } else {
                add_workdays(pred_early_finish, 1)?
            };
            shift_workdays(base, edge.lag)
        }
        DependencyType::SS => shift_workdays(pred_early_start, edge.lag),
        DependencyType::FF => {
            shift_workdays(start_date(pred_early_finish, succ_duration)?, edge.lag)
        }
    }
}

/// Run the forward pass from `project_start` (already a workday).
///
/// Fails when a lag or duration pushes a date outside the range `NaiveDate`
/// can represent; the error names the activity whose date overflowed.
pub fn forward_pass(
    network: &ActivityNetwork<'_>,
    project_start: NaiveDate,
    verbosity: u8,
) -> Result<ForwardPassResult, ScheduleError> {
    let n = network.len();
    let out_of_range = |idx: usize| {
        let activity_id = network.activities[idx].id;
        move |source: CalendarError| ScheduleError::DateOutOfRange {
            pass: Pass::Forward,
            activity_id,
            source,
        }
    };

    let mut early_start = vec![project_start; n];
    let mut early_finish = (0..n)
        .map(|idx| finish_date(project_start, network.duration(idx)).map_err(out_of_range(idx)))
        .collect::<Result<Vec<NaiveDate>, _>>()?;

    let max_iterations = network.max_iterations();
    let mut iterations = 0;
    let mut converged = n == 0;

    while !converged && iterations < max_iterations {
        iterations += 1;
        let mut changed = false;

        for idx in 0..n {
            let duration = network.duration(idx);
            let mut candidate = project_start;

            for edge in &network.preds[idx] {
                let pred = edge.index;
                let start = successor_early_start(
                    edge,
                    early_start[pred],
                    early_finish[pred],
                    network.duration(pred),
                    duration,
                )
                .map_err(out_of_range(idx))?;
                log_checks!(
                    verbosity,
                    "  forward: {} <- {} {}{:+}: candidate start {}",
                    network.activities[idx].id,
                    network.activities[pred].id,
                    edge.dep_type,
                    edge.lag,
                    start
                );
                candidate = candidate.max(start);
            }

            if candidate != early_start[idx] {
                early_start[idx] = candidate;
                early_finish[idx] = finish_date(candidate, duration).map_err(out_of_range(idx))?;
                changed = true;
                log_changes!(
                    verbosity,
                    "forward: activity {} early start {} finish {}",
                    network.activities[idx].id,
                    early_start[idx],
                    early_finish[idx]
                );
            }
        }

        log_debug!(
            verbosity,
            "forward: sweep {}/{} {}",
            iterations,
            max_iterations,
            if changed { "moved dates" } else { "stable" }
        );
        if !changed {
            converged = true;
        }
    }

    if !converged {
        tracing::warn!(
            iterations,
            activities = n,
            "forward pass did not converge; returning partial early dates"
        );
    }

    Ok(ForwardPassResult {
        early_start,
        early_finish,
        iterations,
        converged,
    })
}
