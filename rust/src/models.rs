//! Core data types for the schedule engine.

use chrono::NaiveDate;
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::dependency::{parse_predecessors, ParsedPredecessor};

/// Marker for the zero-duration activities that bound a project.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentinel {
    Start,
    End,
}

/// An input activity as produced by ingestion or generation.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[pyo3(get, set)]
    pub id: u32,
    #[pyo3(get, set)]
    pub name: String,
    /// Duration in workdays (0 for milestones and sentinels).
    #[pyo3(get, set)]
    pub duration: u32,
    /// Encoded predecessor list, e.g. `"4FS,5SS+3"`.
    #[pyo3(get, set)]
    #[serde(default)]
    pub predecessors: String,
    /// Explicit sentinel kind. When unset the name is inspected instead.
    #[pyo3(get, set)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinel: Option<Sentinel>,
}

impl Activity {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        duration: u32,
        predecessors: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            duration,
            predecessors: predecessors.into(),
            sentinel: None,
        }
    }

    pub fn with_sentinel(mut self, sentinel: Sentinel) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    /// Decode the predecessor field leniently.
    pub fn parsed_predecessors(&self) -> Vec<ParsedPredecessor> {
        parse_predecessors(&self.predecessors)
    }

    /// Sentinel kind, falling back to a case-insensitive substring match of
    /// the configured markers against the name.
    pub fn resolve_sentinel(&self, config: &EngineConfig) -> Option<Sentinel> {
        if self.sentinel.is_some() {
            return self.sentinel;
        }
        let name = self.name.to_lowercase();
        if name.contains(&config.start_marker.to_lowercase()) {
            Some(Sentinel::Start)
        } else if name.contains(&config.end_marker.to_lowercase()) {
            Some(Sentinel::End)
        } else {
            None
        }
    }
}

#[pymethods]
impl Activity {
    #[new]
    #[pyo3(signature = (id, name, duration, predecessors=String::new(), sentinel=None))]
    fn py_new(
        id: u32,
        name: String,
        duration: u32,
        predecessors: String,
        sentinel: Option<Sentinel>,
    ) -> Self {
        Self {
            id,
            name,
            duration,
            predecessors,
            sentinel,
        }
    }

    #[pyo3(name = "parsed_predecessors")]
    fn py_parsed_predecessors(&self) -> Vec<ParsedPredecessor> {
        self.parsed_predecessors()
    }

    fn __repr__(&self) -> String {
        format!(
            "Activity(id={}, name={:?}, duration={}, predecessors={:?})",
            self.id, self.name, self.duration, self.predecessors
        )
    }
}

/// An activity annotated with CPM results.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledActivity {
    #[pyo3(get)]
    pub id: u32,
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub duration: u32,
    #[pyo3(get)]
    pub predecessors: String,
    #[pyo3(get)]
    pub early_start: NaiveDate,
    #[pyo3(get)]
    pub early_finish: NaiveDate,
    #[pyo3(get)]
    pub late_start: NaiveDate,
    #[pyo3(get)]
    pub late_finish: NaiveDate,
    /// Slack in workdays, never negative.
    #[pyo3(get)]
    pub total_float: i64,
    #[pyo3(get)]
    pub is_critical: bool,
}

#[pymethods]
impl ScheduledActivity {
    fn __repr__(&self) -> String {
        format!(
            "ScheduledActivity(id={}, start={}, finish={}, float={}, critical={})",
            self.id, self.early_start, self.early_finish, self.total_float, self.is_critical
        )
    }
}

/// Full output of one engine run.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Activities ordered by `(early_start, id)`.
    #[pyo3(get)]
    pub activities: Vec<ScheduledActivity>,
    /// First workday on or after the requested start date.
    #[pyo3(get)]
    pub project_start: NaiveDate,
    /// Latest early finish across all activities.
    #[pyo3(get)]
    pub project_end: NaiveDate,
    #[pyo3(get)]
    pub forward_converged: bool,
    #[pyo3(get)]
    pub backward_converged: bool,
}

impl Schedule {
    /// Ids of critical activities in output order.
    pub fn critical_path(&self) -> Vec<u32> {
        self.activities
            .iter()
            .filter(|a| a.is_critical)
            .map(|a| a.id)
            .collect()
    }

    pub fn get(&self, id: u32) -> Option<&ScheduledActivity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn converged(&self) -> bool {
        self.forward_converged && self.backward_converged
    }
}

#[pymethods]
impl Schedule {
    #[pyo3(name = "critical_path")]
    fn py_critical_path(&self) -> Vec<u32> {
        self.critical_path()
    }

    /// Serialize to the JSON shape consumed by the rendering layer.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(self)
            .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    }

    fn __len__(&self) -> usize {
        self.activities.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Schedule(activities={}, start={}, end={}, converged={})",
            self.activities.len(),
            self.project_start,
            self.project_end,
            self.converged()
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActivityPayload {
    List(Vec<Activity>),
    Wrapped { activities: Vec<Activity> },
}

/// Decode activities from JSON: either a bare array or `{"activities": [...]}`.
pub fn activities_from_json(text: &str) -> Result<Vec<Activity>, serde_json::Error> {
    let payload: ActivityPayload = serde_json::from_str(text)?;
    Ok(match payload {
        ActivityPayload::List(activities) => activities,
        ActivityPayload::Wrapped { activities } => activities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_from_name_case_insensitive() {
        let config = EngineConfig::default();
        let start = Activity::new(1, "PROJECT START", 0, "");
        let end = Activity::new(9, "Milestone: Project End", 0, "8");
        let task = Activity::new(2, "Pour foundation", 5, "1");
        assert_eq!(start.resolve_sentinel(&config), Some(Sentinel::Start));
        assert_eq!(end.resolve_sentinel(&config), Some(Sentinel::End));
        assert_eq!(task.resolve_sentinel(&config), None);
    }

    #[test]
    fn test_explicit_sentinel_wins() {
        let config = EngineConfig::default();
        let kickoff = Activity::new(1, "Kickoff", 0, "").with_sentinel(Sentinel::Start);
        assert_eq!(kickoff.resolve_sentinel(&config), Some(Sentinel::Start));
    }

    #[test]
    fn test_alternate_phrasing_not_matched() {
        let config = EngineConfig::default();
        let start = Activity::new(1, "Start of project", 0, "");
        assert_eq!(start.resolve_sentinel(&config), None);
    }

    #[test]
    fn test_activities_from_json_bare_array() {
        let json = r#"[
            {"id": 1, "name": "Project Start", "duration": 0},
            {"id": 2, "name": "Excavation", "duration": 3, "predecessors": "1FS"}
        ]"#;
        let activities = activities_from_json(json).unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].predecessors, "");
        assert_eq!(activities[1].parsed_predecessors().len(), 1);
    }

    #[test]
    fn test_activities_from_json_wrapped() {
        let json = r#"{"activities": [
            {"id": 3, "name": "Handover", "duration": 0, "predecessors": "2", "sentinel": "end"}
        ]}"#;
        let activities = activities_from_json(json).unwrap();
        assert_eq!(activities[0].sentinel, Some(Sentinel::End));
    }

    #[test]
    fn test_activities_from_json_rejects_negative_duration() {
        let json = r#"[{"id": 1, "name": "Bad", "duration": -2}]"#;
        assert!(activities_from_json(json).is_err());
    }
}
