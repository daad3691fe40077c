//! Structural validation of an activity list.
//!
//! Checks, in order, collecting every finding instead of stopping at the
//! first:
//! 1. Start and End sentinels are present (halts when either is missing)
//! 2. Activity ids are unique
//! 3. Every predecessor reference resolves to a known id
//! 4. Every activity except the End sentinel has a successor
//! 5. Every activity is reachable from the Start sentinel
//!
//! Validation is pure: no I/O, no mutation of its input.

use pyo3::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::config::EngineConfig;
use crate::log_checks;
use crate::models::{Activity, Sentinel};
use crate::network::ActivityNetwork;

/// Categories of validation findings.
#[pyclass(eq, eq_int)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationIssueKind {
    /// No Start or End sentinel activity.
    MissingSentinel,
    /// More than one Start or End sentinel activity.
    DuplicateSentinel,
    /// Two activities share an id.
    DuplicateId,
    /// A predecessor reference names an id that doesn't exist.
    UnresolvedReference,
    /// An activity other than End has no successor.
    Dangling,
    /// An activity cannot be reached from Start.
    Orphaned,
}

/// A single validation finding.
#[pyclass]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[pyo3(get)]
    pub kind: ValidationIssueKind,
    /// Human-readable description, suitable for feeding back to a generator.
    #[pyo3(get)]
    pub message: String,
    /// Activity the finding is about, when there is one.
    #[pyo3(get)]
    pub activity_id: Option<u32>,
}

impl ValidationIssue {
    fn new(
        kind: ValidationIssueKind,
        message: impl Into<String>,
        activity_id: Option<u32>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            activity_id,
        }
    }
}

#[pymethods]
impl ValidationIssue {
    fn __repr__(&self) -> String {
        format!("ValidationIssue({:?}, {:?})", self.kind, self.message)
    }
}

/// Outcome of validating an activity list.
#[pyclass]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    #[pyo3(get)]
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn push(&mut self, issue: ValidationIssue, verbosity: u8) {
        log_checks!(verbosity, "validation: {}", issue.message);
        self.issues.push(issue);
    }

    pub fn ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Error messages in the order they were found.
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.message.clone()).collect()
    }

    pub fn has(&self, kind: ValidationIssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}

#[pymethods]
impl ValidationReport {
    #[getter(ok)]
    fn py_ok(&self) -> bool {
        self.ok()
    }

    #[getter(errors)]
    fn py_errors(&self) -> Vec<String> {
        self.errors()
    }

    fn __bool__(&self) -> bool {
        self.ok()
    }

    fn __repr__(&self) -> String {
        format!(
            "ValidationReport(ok={}, errors={})",
            self.ok(),
            self.issues.len()
        )
    }
}

fn describe(activity: &Activity) -> String {
    format!("'{}' (ID {})", activity.name, activity.id)
}

fn check_sentinel(
    activities: &[Activity],
    config: &EngineConfig,
    kind: Sentinel,
    label: &str,
    marker: &str,
    report: &mut ValidationReport,
) -> Option<usize> {
    let found: Vec<usize> = activities
        .iter()
        .enumerate()
        .filter(|(_, a)| a.resolve_sentinel(config) == Some(kind))
        .map(|(idx, _)| idx)
        .collect();

    match found.as_slice() {
        [] => {
            report.push(
                ValidationIssue::new(
                    ValidationIssueKind::MissingSentinel,
                    format!("Missing {label} activity: no activity name contains \"{marker}\""),
                    None,
                ),
                config.verbosity,
            );
            None
        }
        [only] => Some(*only),
        [first, ..] => {
            let ids: Vec<String> = found
                .iter()
                .map(|&idx| activities[idx].id.to_string())
                .collect();
            report.push(
                ValidationIssue::new(
                    ValidationIssueKind::DuplicateSentinel,
                    format!(
                        "Multiple {label} activities found (IDs {}); expected exactly one",
                        ids.join(", ")
                    ),
                    None,
                ),
                config.verbosity,
            );
            Some(*first)
        }
    }
}

/// Validate with the default sentinel markers.
pub fn validate(activities: &[Activity]) -> ValidationReport {
    validate_with_config(activities, &EngineConfig::default())
}

/// Validate the structure of `activities`.
pub fn validate_with_config(activities: &[Activity], config: &EngineConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    let verbosity = config.verbosity;

    let start = check_sentinel(
        activities,
        config,
        Sentinel::Start,
        "Project Start",
        &config.start_marker,
        &mut report,
    );
    let end = check_sentinel(
        activities,
        config,
        Sentinel::End,
        "Project End",
        &config.end_marker,
        &mut report,
    );
    let (Some(start), Some(_)) = (start, end) else {
        return report;
    };

    let network = ActivityNetwork::new(activities);

    let mut seen_ids: FxHashSet<u32> = FxHashSet::default();
    for activity in activities {
        if !seen_ids.insert(activity.id) {
            report.push(
                ValidationIssue::new(
                    ValidationIssueKind::DuplicateId,
                    format!(
                        "Duplicate activity ID {} used by {}",
                        activity.id,
                        describe(activity)
                    ),
                    Some(activity.id),
                ),
                verbosity,
            );
        }
    }

    for activity in activities {
        for parsed in activity.parsed_predecessors() {
            if !network.index_of.contains_key(&parsed.ref_id) {
                report.push(
                    ValidationIssue::new(
                        ValidationIssueKind::UnresolvedReference,
                        format!(
                            "Activity {} references non-existent predecessor ID {}",
                            describe(activity),
                            parsed.ref_id
                        ),
                        Some(activity.id),
                    ),
                    verbosity,
                );
            }
        }
    }

    for (idx, activity) in activities.iter().enumerate() {
        if activity.resolve_sentinel(config) == Some(Sentinel::End) {
            continue;
        }
        if network.succs[idx].is_empty() {
            report.push(
                ValidationIssue::new(
                    ValidationIssueKind::Dangling,
                    format!(
                        "Dangling activity {} has no successors; every activity must lead to Project End",
                        describe(activity)
                    ),
                    Some(activity.id),
                ),
                verbosity,
            );
        }
    }

    let mut visited = vec![false; activities.len()];
    let mut queue: VecDeque<usize> = VecDeque::from([start]);
    visited[start] = true;
    while let Some(idx) = queue.pop_front() {
        for edge in &network.succs[idx] {
            if !visited[edge.index] {
                visited[edge.index] = true;
                queue.push_back(edge.index);
            }
        }
    }

    for (idx, activity) in activities.iter().enumerate() {
        if !visited[idx] {
            report.push(
                ValidationIssue::new(
                    ValidationIssueKind::Orphaned,
                    format!(
                        "Orphaned activity {} is not reachable from Project Start",
                        describe(activity)
                    ),
                    Some(activity.id),
                ),
                verbosity,
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_schedule() -> Vec<Activity> {
        vec![
            Activity::new(1, "Project Start", 0, ""),
            Activity::new(2, "Site prep", 5, "1FS"),
            Activity::new(3, "Foundation", 10, "2FS"),
            Activity::new(4, "Utilities", 4, "2SS+2"),
            Activity::new(5, "Project End", 0, "3FS,4FF"),
        ]
    }

    #[test]
    fn test_valid_schedule_ok() {
        let report = validate(&valid_schedule());
        assert!(report.ok(), "unexpected errors: {:?}", report.errors());
        assert!(report.errors().is_empty());
    }

    #[test]
    fn test_missing_end_halts() {
        let activities = vec![
            Activity::new(1, "Project Start", 0, ""),
            Activity::new(2, "Dig", 3, "1"),
            Activity::new(3, "Orphan", 3, ""),
        ];
        let report = validate(&activities);
        assert!(!report.ok());
        assert_eq!(report.issues.len(), 1);
        assert!(report.errors()[0].contains("Project End"));
        assert_eq!(report.issues[0].kind, ValidationIssueKind::MissingSentinel);
    }

    #[test]
    fn test_missing_both_sentinels_reports_both() {
        let activities = vec![Activity::new(1, "Dig", 3, "")];
        let errors = validate(&activities).errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("Project Start"));
        assert!(errors[1].contains("Project End"));
    }

    #[test]
    fn test_unresolved_reference_and_orphans_in_one_call() {
        let activities = vec![
            Activity::new(1, "Project Start", 0, ""),
            Activity::new(2, "Framing", 5, "1FS"),
            Activity::new(7, "Roofing", 3, "99FS"),
            Activity::new(8, "Project End", 0, "2FS,7FS"),
        ];
        let report = validate(&activities);
        assert!(!report.ok());

        let unresolved: Vec<&ValidationIssue> = report
            .issues
            .iter()
            .filter(|i| i.kind == ValidationIssueKind::UnresolvedReference)
            .collect();
        assert_eq!(unresolved.len(), 1);
        assert!(unresolved[0].message.contains("99"));
        assert_eq!(unresolved[0].activity_id, Some(7));

        assert!(report.has(ValidationIssueKind::Orphaned));
        let orphan = report
            .issues
            .iter()
            .find(|i| i.kind == ValidationIssueKind::Orphaned)
            .unwrap();
        assert_eq!(orphan.activity_id, Some(7));
        assert!(orphan.message.contains("Roofing"));
    }

    #[test]
    fn test_dangling_activity_reported() {
        let mut activities = valid_schedule();
        activities.push(Activity::new(6, "Landscaping", 2, "3FS"));
        let report = validate(&activities);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, ValidationIssueKind::Dangling);
        assert!(report.errors()[0].contains("Landscaping"));
        assert!(report.errors()[0].contains("ID 6"));
    }

    #[test]
    fn test_end_sentinel_exempt_from_dangling() {
        let report = validate(&valid_schedule());
        assert!(!report.has(ValidationIssueKind::Dangling));
    }

    #[test]
    fn test_island_is_both_dangling_and_orphaned() {
        let mut activities = valid_schedule();
        activities.push(Activity::new(9, "Island", 1, ""));
        let report = validate(&activities);
        let kinds: Vec<ValidationIssueKind> = report.issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![ValidationIssueKind::Dangling, ValidationIssueKind::Orphaned]
        );
    }

    #[test]
    fn test_duplicate_ids_and_sentinels() {
        let activities = vec![
            Activity::new(1, "Project Start", 0, ""),
            Activity::new(2, "Project Start (copy)", 0, "1"),
            Activity::new(2, "Pour", 2, "1"),
            Activity::new(3, "Project End", 0, "2"),
        ];
        let report = validate(&activities);
        assert!(report.has(ValidationIssueKind::DuplicateSentinel));
        assert!(report.has(ValidationIssueKind::DuplicateId));
        assert!(report.errors()[0].contains("IDs 1, 2"));
    }

    #[test]
    fn test_explicit_sentinels_and_custom_markers() {
        let activities = vec![
            Activity::new(1, "Mobilization", 0, "").with_sentinel(Sentinel::Start),
            Activity::new(2, "Build", 5, "1"),
            Activity::new(3, "Handover", 0, "2"),
        ];
        let config = EngineConfig {
            end_marker: "handover".to_string(),
            ..EngineConfig::default()
        };
        assert!(validate_with_config(&activities, &config).ok());
        assert!(!validate(&activities).ok());
    }

    #[test]
    fn test_malformed_tokens_are_not_errors() {
        let mut activities = valid_schedule();
        activities[1].predecessors = "1FS,garbage".to_string();
        assert!(validate(&activities).ok());
    }

    #[test]
    fn test_validation_does_not_mutate_input() {
        let activities = valid_schedule();
        let before = activities.clone();
        let _ = validate(&activities);
        assert_eq!(activities, before);
    }
}
