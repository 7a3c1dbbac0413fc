//! Constraint model construction.
//!
//! Pure translation of an [`Instance`] into decision variables and
//! constraints; no search happens here. Produces:
//!
//! - Precedence edges for consecutive tasks of the same job:
//!   `start(t_{i+1}) >= start(t_i) + duration(t_i)`
//! - One disjunctive pair per pair of tasks sharing a machine (a binary
//!   ordering choice)
//! - Start-time domains `[0, horizon - duration]` with horizon = sum of all
//!   durations, a safe upper bound on any feasible makespan

use crate::instance::Instance;

/// Chosen ordering for a disjunctive pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOrder {
    /// Task `a` fully precedes task `b`.
    AFirst,
    /// Task `b` fully precedes task `a`.
    BFirst,
}

impl PairOrder {
    /// The opposite ordering.
    pub fn flipped(self) -> Self {
        match self {
            PairOrder::AFirst => PairOrder::BFirst,
            PairOrder::BFirst => PairOrder::AFirst,
        }
    }
}

/// A binary mutual-exclusion choice between two tasks on one machine.
#[derive(Debug, Clone, Copy)]
pub struct DisjunctivePair {
    /// First task (flat index).
    pub a: usize,
    /// Second task (flat index).
    pub b: usize,
    /// Shared machine (index into the instance's sorted machine list).
    pub machine: usize,
}

/// Propagatable constraint model for one instance.
///
/// Task indices refer to the instance's flattened task list.
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    /// Number of tasks (decision variables).
    pub task_count: usize,
    /// Processing duration per task.
    pub durations: Vec<i64>,
    /// Intra-job precedence edges `(before, after)`.
    pub precedences: Vec<(usize, usize)>,
    /// All disjunctive pairs, grouped machine by machine.
    pub pairs: Vec<DisjunctivePair>,
    /// Pair indices per machine.
    pub machine_pairs: Vec<Vec<usize>>,
    /// Upper bound on any feasible makespan.
    pub horizon: i64,
}

impl ConstraintModel {
    /// Builds the constraint model for an instance.
    ///
    /// Expected never to fail: the instance already guarantees validity.
    pub fn build(instance: &Instance) -> Self {
        let flat = instance.flat();
        let durations: Vec<i64> = flat.iter().map(|t| t.duration).collect();

        let mut precedences = Vec::new();
        for job in 0..instance.jobs().len() {
            let tasks = instance.job_task_indices(job);
            for w in tasks.windows(2) {
                precedences.push((w[0], w[1]));
            }
        }

        let machine_count = instance.machines().len();
        let mut pairs = Vec::new();
        let mut machine_pairs = vec![Vec::new(); machine_count];
        for machine in 0..machine_count {
            let tasks = instance.machine_task_indices(machine);
            for i in 0..tasks.len() {
                for j in (i + 1)..tasks.len() {
                    machine_pairs[machine].push(pairs.len());
                    pairs.push(DisjunctivePair {
                        a: tasks[i],
                        b: tasks[j],
                        machine,
                    });
                }
            }
        }

        Self {
            task_count: flat.len(),
            durations,
            precedences,
            pairs,
            machine_pairs,
            horizon: instance.horizon(),
        }
    }

    /// Number of disjunctive pairs.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Number of precedence edges.
    pub fn precedence_count(&self) -> usize {
        self.precedences.len()
    }

    /// The ordering edge `(before, after)` implied by resolving a pair.
    pub(crate) fn pair_edge(&self, pair: usize, order: PairOrder) -> (usize, usize) {
        let p = &self.pairs[pair];
        match order {
            PairOrder::AFirst => (p.a, p.b),
            PairOrder::BFirst => (p.b, p.a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::TaskRecord;

    fn two_job_instance() -> Instance {
        // J1: M1(3) then M2(2); J2: M2(4)
        Instance::build(&[
            TaskRecord::new("J1", 0, "M1", 3),
            TaskRecord::new("J1", 1, "M2", 2),
            TaskRecord::new("J2", 0, "M2", 4),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_counts() {
        let model = ConstraintModel::build(&two_job_instance());
        assert_eq!(model.task_count, 3);
        assert_eq!(model.precedence_count(), 1);
        // M1 hosts one task, M2 two → a single disjunctive pair
        assert_eq!(model.pair_count(), 1);
        assert_eq!(model.horizon, 9);
    }

    #[test]
    fn test_pairs_grouped_by_machine() {
        let model = ConstraintModel::build(&two_job_instance());
        // Machine 0 = M1 (sorted order): no pairs; machine 1 = M2: one pair.
        assert!(model.machine_pairs[0].is_empty());
        assert_eq!(model.machine_pairs[1], vec![0]);
        assert_eq!(model.pairs[0].machine, 1);
    }

    #[test]
    fn test_pair_edge_orientation() {
        let model = ConstraintModel::build(&two_job_instance());
        let p = model.pairs[0];
        assert_eq!(model.pair_edge(0, PairOrder::AFirst), (p.a, p.b));
        assert_eq!(model.pair_edge(0, PairOrder::BFirst), (p.b, p.a));
    }

    #[test]
    fn test_pair_count_quadratic_per_machine() {
        // Four single-task jobs on one machine → C(4,2) = 6 pairs.
        let records: Vec<TaskRecord> = (0..4)
            .map(|i| TaskRecord::new(format!("J{i}"), 0, "M1", 1))
            .collect();
        let inst = Instance::build(&records).unwrap();
        let model = ConstraintModel::build(&inst);
        assert_eq!(model.pair_count(), 6);
        assert_eq!(model.precedence_count(), 0);
    }

    #[test]
    fn test_empty_instance() {
        let inst = Instance::build(&[]).unwrap();
        let model = ConstraintModel::build(&inst);
        assert_eq!(model.task_count, 0);
        assert_eq!(model.pair_count(), 0);
    }
}
