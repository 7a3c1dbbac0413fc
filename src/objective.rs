//! Objective evaluation.
//!
//! The evaluator is the only component aware of objective semantics: the
//! search engine just compares scores (lower is better, strict improvement
//! replaces the best-so-far, ties keep the earlier find).
//!
//! Every objective is monotone non-decreasing in task start times, so a
//! score computed on earliest-start bounds is a valid lower bound for the
//! whole subtree — the search engine relies on this for pruning.

use serde::{Deserialize, Serialize};

use crate::instance::Instance;
use crate::models::Schedule;

/// Schedule scoring policy. Lower scores are better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// Completion time of the last-finishing task.
    #[default]
    Makespan,
    /// Makespan plus the summed deadline tardiness of all jobs
    /// (`max(0, completion - deadline)` per job with a deadline).
    MakespanPlusTardiness,
    /// Sum of job completion times weighted by job priority.
    WeightedCompletion,
}

impl Objective {
    /// Scores a completed schedule.
    pub fn evaluate(&self, schedule: &Schedule, instance: &Instance) -> i64 {
        match self {
            Objective::Makespan => schedule.makespan(),
            Objective::MakespanPlusTardiness => {
                let mut score = schedule.makespan();
                for job in instance.jobs() {
                    if let (Some(deadline), Some(completion)) =
                        (job.deadline, schedule.job_completion_time(&job.id))
                    {
                        score += (completion - deadline).max(0);
                    }
                }
                score
            }
            Objective::WeightedCompletion => instance
                .jobs()
                .iter()
                .filter_map(|job| {
                    schedule
                        .job_completion_time(&job.id)
                        .map(|c| job.weight.max(0) * c)
                })
                .sum(),
        }
    }

    /// Scores a start-time vector indexed by flat task.
    ///
    /// Used both on complete assignments and on earliest-start bounds (where
    /// it yields a subtree lower bound).
    pub(crate) fn score_bounds(
        &self,
        instance: &Instance,
        starts: &[i64],
        durations: &[i64],
    ) -> i64 {
        let makespan = starts
            .iter()
            .zip(durations)
            .map(|(s, d)| s + d)
            .max()
            .unwrap_or(0);

        match self {
            Objective::Makespan => makespan,
            Objective::MakespanPlusTardiness => {
                let mut score = makespan;
                for (j, job) in instance.jobs().iter().enumerate() {
                    if let Some(deadline) = job.deadline {
                        let completion = self.job_completion(instance, starts, durations, j);
                        score += (completion - deadline).max(0);
                    }
                }
                score
            }
            Objective::WeightedCompletion => (0..instance.jobs().len())
                .map(|j| {
                    // Negative weights are clamped so the bound stays monotone.
                    instance.jobs()[j].weight.max(0)
                        * self.job_completion(instance, starts, durations, j)
                })
                .sum(),
        }
    }

    fn job_completion(
        &self,
        instance: &Instance,
        starts: &[i64],
        durations: &[i64],
        job: usize,
    ) -> i64 {
        instance
            .job_task_indices(job)
            .iter()
            .map(|&t| starts[t] + durations[t])
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::TaskRecord;
    use crate::models::Assignment;

    fn instance_with_deadlines() -> Instance {
        Instance::build(&[
            TaskRecord::new("J1", 0, "M1", 3).with_deadline(2).with_weight(2),
            TaskRecord::new("J2", 0, "M2", 4).with_deadline(10),
        ])
        .unwrap()
    }

    fn schedule_at(s1: i64, s2: i64) -> Schedule {
        // J1 and J2 start times; durations 3 and 4.
        let mut s = Schedule::new();
        s.add_assignment(Assignment::new("J1", 0, "M1", s1, s1 + 3));
        s.add_assignment(Assignment::new("J2", 0, "M2", s2, s2 + 4));
        s
    }

    #[test]
    fn test_makespan_objective() {
        let inst = instance_with_deadlines();
        let s = schedule_at(0, 0);
        assert_eq!(Objective::Makespan.evaluate(&s, &inst), 4);
    }

    #[test]
    fn test_tardiness_objective() {
        let inst = instance_with_deadlines();
        // J1 completes at 3 with deadline 2 → tardiness 1; J2 on time.
        let s = schedule_at(0, 0);
        assert_eq!(Objective::MakespanPlusTardiness.evaluate(&s, &inst), 4 + 1);
    }

    #[test]
    fn test_weighted_completion_objective() {
        let inst = instance_with_deadlines();
        let s = schedule_at(0, 0);
        // J1 weight 2, completion 3; J2 weight 1, completion 4.
        assert_eq!(Objective::WeightedCompletion.evaluate(&s, &inst), 2 * 3 + 4);
    }

    #[test]
    fn test_score_bounds_matches_evaluate() {
        let inst = instance_with_deadlines();
        let s = schedule_at(0, 0);
        let starts = vec![0, 0];
        let durations = vec![3, 4];
        for obj in [
            Objective::Makespan,
            Objective::MakespanPlusTardiness,
            Objective::WeightedCompletion,
        ] {
            assert_eq!(
                obj.score_bounds(&inst, &starts, &durations),
                obj.evaluate(&s, &inst),
                "{obj:?}"
            );
        }
    }

    #[test]
    fn test_monotone_in_starts() {
        let inst = instance_with_deadlines();
        let durations = vec![3, 4];
        for obj in [
            Objective::Makespan,
            Objective::MakespanPlusTardiness,
            Objective::WeightedCompletion,
        ] {
            let early = obj.score_bounds(&inst, &[0, 0], &durations);
            let late = obj.score_bounds(&inst, &[5, 2], &durations);
            assert!(early <= late, "{obj:?}");
        }
    }

    #[test]
    fn test_empty() {
        let inst = Instance::build(&[]).unwrap();
        let s = Schedule::new();
        assert_eq!(Objective::Makespan.evaluate(&s, &inst), 0);
        assert_eq!(Objective::Makespan.score_bounds(&inst, &[], &[]), 0);
    }

    #[test]
    fn test_default_is_makespan() {
        assert_eq!(Objective::default(), Objective::Makespan);
    }
}
