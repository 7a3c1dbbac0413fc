//! Solve orchestration.
//!
//! Wires the pipeline together: instance validation → constraint model →
//! greedy incumbent → branch-and-bound search → schedule extraction and
//! metrics. One [`Solver`] call owns all of its state; independent solves
//! can run on separate threads without sharing anything.

use std::time::Duration;

use log::info;
use thiserror::Error;

use crate::analytics::{extract_schedule, ScheduleMetrics};
use crate::cp::{ConstraintModel, SearchBudget, SearchEngine, SearchOutcome};
use crate::greedy::GreedyScheduler;
use crate::instance::{Instance, InvalidInstance, TaskRecord};
use crate::models::Schedule;
use crate::objective::Objective;
use crate::ranking::{ByTotalDuration, RankingRule};

/// Caller-supplied solve options.
#[derive(Debug, Clone)]
pub struct SolveConfig {
    /// Maximum wall-clock time for search (default 5s, suitable for
    /// interactive use).
    pub time_limit: Duration,
    /// Optional cap on branch decisions, mainly for reproducible tests.
    pub max_iterations: Option<u64>,
    /// Scoring policy (default makespan).
    pub objective: Objective,
    /// Seed for branch tie-breaking; identical seeds reproduce identical
    /// solves. `None` uses a fixed default seed.
    pub tie_break_seed: Option<u64>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(5),
            max_iterations: None,
            objective: Objective::Makespan,
            tie_break_seed: None,
        }
    }
}

/// A named solve failure with enough context to fix the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// Malformed input, detected before any search work.
    #[error(transparent)]
    InvalidInstance(#[from] InvalidInstance),
    /// No ordering of machine disjunctions satisfies all constraints.
    /// Defensive: not expected for well-formed job-shop instances.
    #[error("no feasible schedule exists for this instance")]
    Infeasible,
}

/// Result of a successful solve.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// The best schedule found.
    pub schedule: Schedule,
    /// Analytics derived from the schedule.
    pub metrics: ScheduleMetrics,
    /// Whether the search space was exhausted. `false` means the budget ran
    /// out first; re-solving with a larger budget may improve the schedule.
    pub proven_optimal: bool,
    /// Branch decisions taken by the search.
    pub iterations: u64,
}

/// Job-shop solver.
///
/// # Example
///
/// ```
/// use jobshop_engine::instance::TaskRecord;
/// use jobshop_engine::solver::Solver;
///
/// let records = vec![
///     TaskRecord::new("J1", 0, "M1", 3),
///     TaskRecord::new("J1", 1, "M2", 2),
///     TaskRecord::new("J2", 0, "M2", 4),
/// ];
/// let outcome = Solver::new().solve_records(&records).unwrap();
/// assert_eq!(outcome.metrics.makespan, 6);
/// assert!(outcome.proven_optimal);
/// ```
#[derive(Debug)]
pub struct Solver {
    config: SolveConfig,
    ranking: Box<dyn RankingRule>,
}

impl Solver {
    /// Creates a solver with the default configuration.
    pub fn new() -> Self {
        Self {
            config: SolveConfig::default(),
            ranking: Box::new(ByTotalDuration),
        }
    }

    /// Replaces the whole configuration.
    pub fn with_config(mut self, config: SolveConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the search wall-clock budget.
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.config.time_limit = time_limit;
        self
    }

    /// Caps the number of branch decisions.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.config.max_iterations = Some(max_iterations);
        self
    }

    /// Selects the objective.
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.config.objective = objective;
        self
    }

    /// Sets the tie-break seed for reproducible branching.
    pub fn with_tie_break_seed(mut self, seed: u64) -> Self {
        self.config.tie_break_seed = Some(seed);
        self
    }

    /// Swaps the job ranking policy used in metrics.
    pub fn with_ranking(mut self, ranking: impl RankingRule + 'static) -> Self {
        self.ranking = Box::new(ranking);
        self
    }

    /// Validates raw task records and solves the resulting instance.
    pub fn solve_records(&self, records: &[TaskRecord]) -> Result<SolveOutcome, SolveError> {
        let instance = Instance::build(records)?;
        self.solve(&instance)
    }

    /// Solves a validated instance.
    ///
    /// Always returns the best schedule found within the budget; a budget
    /// hit is not an error, only `proven_optimal = false`.
    pub fn solve(&self, instance: &Instance) -> Result<SolveOutcome, SolveError> {
        let model = ConstraintModel::build(instance);
        info!(
            "solving instance: {} tasks, {} machines, {} disjunctive pairs",
            instance.task_count(),
            instance.machines().len(),
            model.pair_count()
        );

        let objective = self.config.objective;
        let incumbent_starts = GreedyScheduler::new().starts(instance);
        let incumbent_score =
            objective.score_bounds(instance, &incumbent_starts, &model.durations);

        let budget = SearchBudget {
            time_limit: self.config.time_limit,
            max_iterations: self.config.max_iterations,
        };
        let seed = self.config.tie_break_seed.unwrap_or(0);
        let engine = SearchEngine::new(&model, instance, objective, seed);

        let (starts, proven_optimal, iterations) =
            match engine.run(&budget, (incumbent_starts, incumbent_score)) {
                SearchOutcome::Optimal {
                    starts, iterations, ..
                } => (starts, true, iterations),
                SearchOutcome::BudgetExceeded {
                    starts, iterations, ..
                } => (starts, false, iterations),
                SearchOutcome::Infeasible => return Err(SolveError::Infeasible),
            };

        let schedule = extract_schedule(instance, &starts);
        let metrics = ScheduleMetrics::calculate(&schedule, instance, self.ranking.as_ref());
        info!(
            "solve finished: makespan {}, optimal proven: {proven_optimal}, {iterations} iterations",
            metrics.makespan
        );

        Ok(SolveOutcome {
            schedule,
            metrics,
            proven_optimal,
            iterations,
        })
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Assignment;
    use crate::ranking::ByCompletion;

    fn scenario_a() -> Vec<TaskRecord> {
        vec![
            TaskRecord::new("J1", 0, "M1", 3),
            TaskRecord::new("J1", 1, "M2", 2),
            TaskRecord::new("J2", 0, "M2", 4),
        ]
    }

    /// A 10-jobs-by-5-machines instance (50 tasks).
    fn large_records() -> Vec<TaskRecord> {
        let mut records = Vec::new();
        for j in 0..10 {
            for p in 0..5u32 {
                let m = (j + p as usize) % 5;
                records.push(TaskRecord::new(
                    format!("J{j:02}"),
                    p,
                    format!("M{m}"),
                    (j % 7 + 1) as i64,
                ));
            }
        }
        records
    }

    fn assert_feasible(schedule: &Schedule, instance: &Instance) {
        for machine in instance.machines() {
            let on_m = schedule.assignments_for_machine(machine);
            for w in on_m.windows(2) {
                assert!(w[0].end <= w[1].start, "overlap on {machine}");
            }
        }
        for job in instance.jobs() {
            let of_j = schedule.assignments_for_job(&job.id);
            assert_eq!(of_j.len(), job.task_count());
            for w in of_j.windows(2) {
                assert!(w[1].start >= w[0].end, "precedence broken in {}", job.id);
            }
            for (a, task) in of_j.iter().zip(&job.tasks) {
                assert!(a.start >= 0);
                assert_eq!(a.duration(), task.duration);
                assert_eq!(a.machine_id, task.machine);
            }
        }
    }

    #[test]
    fn test_scenario_a_optimal_makespan() {
        let outcome = Solver::new().solve_records(&scenario_a()).unwrap();
        assert!(outcome.proven_optimal);
        assert_eq!(outcome.metrics.makespan, 6);
        assert!(outcome.metrics.makespan <= 9); // naive sequential bound

        let instance = Instance::build(&scenario_a()).unwrap();
        assert_feasible(&outcome.schedule, &instance);
    }

    #[test]
    fn test_single_task_single_machine() {
        let outcome = Solver::new()
            .solve_records(&[TaskRecord::new("J1", 0, "M1", 7)])
            .unwrap();
        assert_eq!(outcome.metrics.makespan, 7);
        assert_eq!(
            outcome.schedule.assignments,
            vec![Assignment::new("J1", 0, "M1", 0, 7)]
        );
    }

    #[test]
    fn test_full_parallelism() {
        let records = vec![
            TaskRecord::new("J1", 0, "M1", 3),
            TaskRecord::new("J2", 0, "M2", 9),
            TaskRecord::new("J3", 0, "M3", 4),
        ];
        let outcome = Solver::new().solve_records(&records).unwrap();
        assert_eq!(outcome.metrics.makespan, 9);
        assert!(outcome.proven_optimal);
    }

    #[test]
    fn test_invalid_duration_is_rejected() {
        let records = vec![TaskRecord::new("J1", 0, "M1", 0)];
        let err = Solver::new().solve_records(&records).unwrap_err();
        assert!(matches!(
            err,
            SolveError::InvalidInstance(InvalidInstance::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn test_near_zero_budget_still_feasible() {
        let records = large_records();
        let instance = Instance::build(&records).unwrap();
        let outcome = Solver::new()
            .with_time_limit(Duration::ZERO)
            .solve(&instance)
            .unwrap();

        assert!(!outcome.proven_optimal);
        assert_eq!(outcome.schedule.assignment_count(), 50);
        assert_feasible(&outcome.schedule, &instance);
    }

    #[test]
    fn test_idempotent_with_same_seed() {
        let records = large_records();
        let solve = || {
            Solver::new()
                .with_tie_break_seed(7)
                .with_max_iterations(20_000)
                .with_time_limit(Duration::from_secs(60))
                .solve_records(&records)
                .unwrap()
        };
        let first = solve();
        let second = solve();
        assert_eq!(first.schedule, second.schedule);
        assert_eq!(first.metrics.makespan, second.metrics.makespan);
        assert_eq!(first.iterations, second.iterations);
    }

    #[test]
    fn test_larger_budget_never_worse() {
        let records = large_records();
        let makespan_with = |cap: u64| {
            Solver::new()
                .with_max_iterations(cap)
                .with_time_limit(Duration::from_secs(60))
                .solve_records(&records)
                .unwrap()
                .metrics
                .makespan
        };
        let small = makespan_with(10);
        let medium = makespan_with(1_000);
        let large = makespan_with(50_000);
        assert!(medium <= small);
        assert!(large <= medium);
    }

    #[test]
    fn test_budget_hit_is_flagged_not_an_error() {
        let outcome = Solver::new()
            .with_max_iterations(1)
            .solve_records(&large_records())
            .unwrap();
        assert!(!outcome.proven_optimal);
    }

    #[test]
    fn test_tardiness_objective_changes_result_shape() {
        // A tight deadline on J2 makes the tardiness-aware solve prefer
        // finishing J2 early even though makespan alone would not care.
        let records = vec![
            TaskRecord::new("J1", 0, "M1", 5),
            TaskRecord::new("J2", 0, "M1", 2).with_deadline(2),
        ];
        let outcome = Solver::new()
            .with_objective(Objective::MakespanPlusTardiness)
            .solve_records(&records)
            .unwrap();
        assert!(outcome.proven_optimal);
        // J2 runs first: makespan 7, tardiness 0.
        assert_eq!(outcome.schedule.assignment_for("J2", 0).unwrap().start, 0);
        assert_eq!(outcome.metrics.total_tardiness, 0);
    }

    #[test]
    fn test_weighted_completion_prefers_heavy_job() {
        let records = vec![
            TaskRecord::new("J1", 0, "M1", 4),
            TaskRecord::new("J2", 0, "M1", 4).with_weight(10),
        ];
        let outcome = Solver::new()
            .with_objective(Objective::WeightedCompletion)
            .solve_records(&records)
            .unwrap();
        // The weighted job completes first.
        assert_eq!(outcome.schedule.assignment_for("J2", 0).unwrap().start, 0);
    }

    #[test]
    fn test_ranking_policy_is_pluggable() {
        let outcome = Solver::new()
            .with_ranking(ByCompletion)
            .solve_records(&scenario_a())
            .unwrap();
        // J2 completes at 4, J1 at 6.
        assert_eq!(outcome.metrics.job_ranking, vec!["J2", "J1"]);
    }

    #[test]
    fn test_empty_instance() {
        let outcome = Solver::new().solve_records(&[]).unwrap();
        assert_eq!(outcome.schedule.assignment_count(), 0);
        assert_eq!(outcome.metrics.makespan, 0);
        assert!(outcome.proven_optimal);
    }

    #[test]
    fn test_parallel_solves_share_nothing() {
        use std::thread;

        let handles: Vec<_> = (0..4)
            .map(|seed| {
                thread::spawn(move || {
                    Solver::new()
                        .with_tie_break_seed(seed)
                        .solve_records(&scenario_a())
                        .unwrap()
                        .metrics
                        .makespan
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 6);
        }
    }
}
