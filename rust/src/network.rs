//! Index-based view of an activity list for the CPM passes.

use rustc_hash::FxHashMap;

use crate::dependency::DependencyType;
use crate::models::Activity;

/// One resolved dependency edge. `index` points at the other end of the
/// edge: the predecessor in `preds`, the successor in `succs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub index: usize,
    pub dep_type: DependencyType,
    pub lag: i64,
}

/// Pre-computed activity data, built once per engine run.
/// All lookups use direct array indexing.
pub struct ActivityNetwork<'a> {
    pub activities: &'a [Activity],
    /// Activity id -> position in `activities` (first occurrence wins).
    pub index_of: FxHashMap<u32, usize>,
    /// Incoming edges per activity.
    pub preds: Vec<Vec<Edge>>,
    /// Outgoing edges per activity (inverted `preds`).
    pub succs: Vec<Vec<Edge>>,
}

impl<'a> ActivityNetwork<'a> {
    /// Build the network. References to unknown ids are skipped here; the
    /// validator is the place that reports them.
    pub fn new(activities: &'a [Activity]) -> Self {
        let n = activities.len();
        let mut index_of: FxHashMap<u32, usize> =
            FxHashMap::with_capacity_and_hasher(n, Default::default());
        for (idx, activity) in activities.iter().enumerate() {
            index_of.entry(activity.id).or_insert(idx);
        }

        let mut preds: Vec<Vec<Edge>> = vec![Vec::new(); n];
        let mut succs: Vec<Vec<Edge>> = vec![Vec::new(); n];

        for (idx, activity) in activities.iter().enumerate() {
            for parsed in activity.parsed_predecessors() {
                let Some(&pred_idx) = index_of.get(&parsed.ref_id) else {
                    continue;
                };
                let lag = i64::from(parsed.lag);
                preds[idx].push(Edge {
                    index: pred_idx,
                    dep_type: parsed.dep_type,
                    lag,
                });
                succs[pred_idx].push(Edge {
                    index: idx,
                    dep_type: parsed.dep_type,
                    lag,
                });
            }
        }

        Self {
            activities,
            index_of,
            preds,
            succs,
        }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn duration(&self, idx: usize) -> u32 {
        self.activities[idx].duration
    }

    /// Pass budget for the fixed-point iterations: N squared, at least one.
    pub fn max_iterations(&self) -> usize {
        self.len().saturating_mul(self.len()).max(1)
    }
}
