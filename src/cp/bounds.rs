//! Start-time bounds with trail-based undo.
//!
//! Each task carries an earliest-start (`est`) and latest-start (`lst`)
//! window. Propagation tightens windows to a fixed point over the active
//! ordering edges; a task whose window empties (`est > lst`) is a
//! contradiction. Every tightening is recorded on a trail so backtracking
//! restores bounds without deep copies.

use super::model::ConstraintModel;

/// One undone-able bound tightening.
#[derive(Debug, Clone, Copy)]
enum TrailEntry {
    Est { task: usize, prev: i64 },
    Lst { task: usize, prev: i64 },
}

/// Earliest/latest start windows for all tasks.
#[derive(Debug, Clone)]
pub(crate) struct Bounds {
    est: Vec<i64>,
    lst: Vec<i64>,
    trail: Vec<TrailEntry>,
}

impl Bounds {
    /// Initial domains: `est = 0`, `lst = horizon - duration`.
    pub fn new(model: &ConstraintModel) -> Self {
        let est = vec![0; model.task_count];
        let lst = model
            .durations
            .iter()
            .map(|d| model.horizon - d)
            .collect();
        Self {
            est,
            lst,
            trail: Vec::new(),
        }
    }

    pub fn est(&self, task: usize) -> i64 {
        self.est[task]
    }

    /// Slack of a task's start window (`lst - est`).
    pub fn slack(&self, task: usize) -> i64 {
        self.lst[task] - self.est[task]
    }

    /// Earliest starts for all tasks (a complete assignment once every
    /// disjunction is resolved and bounds are consistent).
    pub fn est_all(&self) -> &[i64] {
        &self.est
    }

    /// Current trail position, for later [`Bounds::undo_to`].
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Rolls bounds back to a previous mark.
    pub fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            match self.trail.pop() {
                Some(TrailEntry::Est { task, prev }) => self.est[task] = prev,
                Some(TrailEntry::Lst { task, prev }) => self.lst[task] = prev,
                None => break,
            }
        }
    }

    fn raise_est(&mut self, task: usize, value: i64) -> bool {
        if value > self.est[task] {
            self.trail.push(TrailEntry::Est {
                task,
                prev: self.est[task],
            });
            self.est[task] = value;
            true
        } else {
            false
        }
    }

    fn lower_lst(&mut self, task: usize, value: i64) -> bool {
        if value < self.lst[task] {
            self.trail.push(TrailEntry::Lst {
                task,
                prev: self.lst[task],
            });
            self.lst[task] = value;
            true
        } else {
            false
        }
    }

    /// Tightens windows to a fixed point over the given ordering edges.
    ///
    /// For each edge `(u, v)`: forward pass raises `est(v)` to
    /// `est(u) + duration(u)`, backward pass lowers `lst(u)` to
    /// `lst(v) - duration(u)`. Returns `false` on contradiction
    /// (some window emptied); the caller then backtracks.
    ///
    /// Terminates: bounds are integers, only tighten, and are boxed by
    /// `[0, horizon]`; ordering cycles drive a window empty and are
    /// reported as contradictions.
    pub fn propagate(&mut self, edges: &[(usize, usize)], durations: &[i64]) -> bool {
        let mut changed = true;
        while changed {
            changed = false;
            for &(u, v) in edges {
                if self.raise_est(v, self.est[u] + durations[u]) {
                    if self.est[v] > self.lst[v] {
                        return false;
                    }
                    changed = true;
                }
                if self.lower_lst(u, self.lst[v] - durations[u]) {
                    if self.est[u] > self.lst[u] {
                        return false;
                    }
                    changed = true;
                }
            }
        }
        true
    }

    /// Lower bound on the makespan of any completion of the current
    /// subtree: `max(est + duration)`.
    pub fn makespan_lower_bound(&self, durations: &[i64]) -> i64 {
        self.est
            .iter()
            .zip(durations)
            .map(|(s, d)| s + d)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::model::ConstraintModel;
    use crate::instance::{Instance, TaskRecord};

    fn chain_model() -> ConstraintModel {
        // One job, three tasks (durations 3, 2, 4) on distinct machines.
        let inst = Instance::build(&[
            TaskRecord::new("J1", 0, "M1", 3),
            TaskRecord::new("J1", 1, "M2", 2),
            TaskRecord::new("J1", 2, "M3", 4),
        ])
        .unwrap();
        ConstraintModel::build(&inst)
    }

    #[test]
    fn test_initial_domains() {
        let model = chain_model();
        let bounds = Bounds::new(&model);
        assert_eq!(bounds.est(0), 0);
        assert_eq!(bounds.slack(0), 9 - 3);
        assert_eq!(bounds.slack(2), 9 - 4);
    }

    #[test]
    fn test_forward_backward_pass() {
        let model = chain_model();
        let mut bounds = Bounds::new(&model);
        assert!(bounds.propagate(&model.precedences, &model.durations));

        // Forward: est = 0, 3, 5. Backward from horizon 9: lst = 0, 3, 5.
        assert_eq!(bounds.est(0), 0);
        assert_eq!(bounds.est(1), 3);
        assert_eq!(bounds.est(2), 5);
        assert_eq!(bounds.slack(0), 0);
        assert_eq!(bounds.slack(1), 0);
        assert_eq!(bounds.slack(2), 0);
    }

    #[test]
    fn test_makespan_lower_bound() {
        let model = chain_model();
        let mut bounds = Bounds::new(&model);
        bounds.propagate(&model.precedences, &model.durations);
        assert_eq!(bounds.makespan_lower_bound(&model.durations), 9);
    }

    #[test]
    fn test_cycle_is_contradiction() {
        let model = chain_model();
        let mut bounds = Bounds::new(&model);
        // 0 before 1 and 1 before 0: windows must empty.
        let edges = vec![(0, 1), (1, 0)];
        assert!(!bounds.propagate(&edges, &model.durations));
    }

    #[test]
    fn test_undo_restores_bounds() {
        let model = chain_model();
        let mut bounds = Bounds::new(&model);
        let mark = bounds.mark();
        assert!(bounds.propagate(&model.precedences, &model.durations));
        assert_eq!(bounds.est(2), 5);

        bounds.undo_to(mark);
        assert_eq!(bounds.est(2), 0);
        assert_eq!(bounds.slack(1), 9 - 2);
    }

    #[test]
    fn test_propagate_idempotent() {
        let model = chain_model();
        let mut bounds = Bounds::new(&model);
        assert!(bounds.propagate(&model.precedences, &model.durations));
        let mark = bounds.mark();
        assert!(bounds.propagate(&model.precedences, &model.durations));
        // Second run at the fixed point records nothing.
        assert_eq!(bounds.mark(), mark);
    }
}
