//! Total float and critical-path classification.

use chrono::NaiveDate;

use crate::backward_pass::BackwardPassResult;
use crate::calendar::count_workdays;
use crate::forward_pass::ForwardPassResult;
use crate::models::{Activity, ScheduledActivity};

/// Workdays an activity can slip past `early_finish` without moving the
/// project end. Never negative.
pub fn total_float(early_finish: NaiveDate, late_finish: NaiveDate) -> i64 {
    (count_workdays(early_finish, late_finish) - 1).max(0)
}

/// Combine forward and backward results into annotated activities, sorted
/// by `(early_start, id)`.
pub fn classify(
    activities: &[Activity],
    forward: &ForwardPassResult,
    backward: &BackwardPassResult,
) -> Vec<ScheduledActivity> {
    let mut scheduled: Vec<ScheduledActivity> = activities
        .iter()
        .enumerate()
        .map(|(idx, activity)| {
            let early_finish = forward.early_finish[idx];
            let late_finish = backward.late_finish[idx];
            let float = total_float(early_finish, late_finish);
            ScheduledActivity {
                id: activity.id,
                name: activity.name.clone(),
                duration: activity.duration,
                predecessors: activity.predecessors.clone(),
                early_start: forward.early_start[idx],
                early_finish,
                late_start: backward.late_start[idx],
                late_finish,
                total_float: float,
                is_critical: float <= 0,
            }
        })
        .collect();

    scheduled.sort_by(|a, b| a.early_start.cmp(&b.early_start).then(a.id.cmp(&b.id)));
    scheduled
}
