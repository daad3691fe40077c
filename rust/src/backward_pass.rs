//! Backward pass algorithm for latest finish dates.

use chrono::NaiveDate;

use crate::calendar::{finish_date, shift_workdays, start_date, subtract_workdays, CalendarError};
use crate::dependency::DependencyType;
use crate::engine::{Pass, ScheduleError};
use crate::network::{ActivityNetwork, Edge};
use crate::{log_changes, log_checks, log_debug};

/// Result from the backward pass, indexed like the activity slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackwardPassResult {
    pub late_start: Vec<NaiveDate>,
    pub late_finish: Vec<NaiveDate>,
    pub iterations: usize,
    pub converged: bool,
}

/// Compute when a predecessor must finish for one successor to keep its
/// latest dates.
///
/// Inverts the forward-pass formulas edge by edge. SF again mirrors FS.
pub fn predecessor_late_finish(
    edge: &Edge,
    succ_late_start: NaiveDate,
    succ_late_finish: NaiveDate,
    pred_duration: u32,
) -> Result<NaiveDate, CalendarError> {
    match edge.dep_type {
        DependencyType::FS | DependencyType::SF => {
            let base = shift_workdays(succ_late_start, -edge.lag)?;
            if pred_duration == 0 {
                Ok(base)
            } else {
                subtract_workdays(base, 1)
            }
        }
        DependencyType::SS => {
            let pred_late_start = shift_workdays(succ_late_start, -edge.lag)?;
            finish_date(pred_late_start, pred_duration)
        }
        DependencyType::FF => shift_workdays(succ_late_finish, -edge.lag),
    }
}

/// Run the backward pass from `project_end`.
///
/// Every activity starts with `project_end` as its latest finish; activities
/// with successors are then tightened to the earliest date any successor
/// implies, repeated until nothing moves or the N^2 sweep budget runs out.
pub fn backward_pass(
    network: &ActivityNetwork<'_>,
    project_end: NaiveDate,
    verbosity: u8,
) -> Result<BackwardPassResult, ScheduleError> {
    let n = network.len();
    let out_of_range = |idx: usize| {
        let activity_id = network.activities[idx].id;
        move |source: CalendarError| ScheduleError::DateOutOfRange {
            pass: Pass::Backward,
            activity_id,
            source,
        }
    };

    let mut late_finish = vec![project_end; n];
    let mut late_start = (0..n)
        .map(|idx| start_date(project_end, network.duration(idx)).map_err(out_of_range(idx)))
        .collect::<Result<Vec<NaiveDate>, _>>()?;

    let max_iterations = network.max_iterations();
    let mut iterations = 0;
    let mut converged = n == 0;

    while !converged && iterations < max_iterations {
        iterations += 1;
        let mut changed = false;

        for idx in 0..n {
            let successors = &network.succs[idx];
            if successors.is_empty() {
                continue;
            }
            let duration = network.duration(idx);

            let mut candidate: Option<NaiveDate> = None;
            for edge in successors {
                let succ = edge.index;
                let finish =
                    predecessor_late_finish(edge, late_start[succ], late_finish[succ], duration)
                        .map_err(out_of_range(idx))?;
                log_checks!(
                    verbosity,
                    "  backward: {} -> {} {}{:+}: candidate finish {}",
                    network.activities[idx].id,
                    network.activities[succ].id,
                    edge.dep_type,
                    edge.lag,
                    finish
                );
                candidate = Some(candidate.map_or(finish, |c| c.min(finish)));
            }

            if let Some(finish) = candidate {
                if finish != late_finish[idx] {
                    late_finish[idx] = finish;
                    late_start[idx] = start_date(finish, duration).map_err(out_of_range(idx))?;
                    changed = true;
                    log_changes!(
                        verbosity,
                        "backward: activity {} late finish {}",
                        network.activities[idx].id,
                        finish
                    );
                }
            }
        }

        log_debug!(
            verbosity,
            "backward: sweep {}/{} {}",
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
            "backward pass did not converge; returning partial late dates"
        );
    }

    Ok(BackwardPassResult {
        late_start,
        late_finish,
        iterations,
        converged,
    })
}
