//! Job priority ranking policies.
//!
//! A ranking rule orders job IDs from a completed schedule and its instance.
//! Ranking is orthogonal to the search core: policies can be swapped without
//! touching propagation or branching.
//!
//! # Built-in rules
//!
//! - [`ByTotalDuration`]: most processing work first (default)
//! - [`ByCompletion`]: earliest-finishing job first
//! - [`BySlack`]: tightest deadline slack first
//!
//! All rules break ties by job ID for reproducibility.

use std::fmt::Debug;

use crate::instance::Instance;
use crate::models::Schedule;

/// Orders job IDs by priority, most important first.
pub trait RankingRule: Send + Sync + Debug {
    /// Rule name (e.g., "TOTAL_DURATION").
    fn name(&self) -> &'static str;

    /// Ranks all jobs of the instance under the given schedule.
    fn rank(&self, schedule: &Schedule, instance: &Instance) -> Vec<String>;
}

fn rank_by_key(instance: &Instance, mut key: impl FnMut(usize) -> i64) -> Vec<String> {
    let mut order: Vec<usize> = (0..instance.jobs().len()).collect();
    // Ascending key; equal keys keep sorted job-id order.
    order.sort_by_key(|&j| key(j));
    order
        .into_iter()
        .map(|j| instance.jobs()[j].id.clone())
        .collect()
}

/// Ranks jobs by total processing duration, descending.
///
/// Long jobs dominate the makespan, so they lead the ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByTotalDuration;

impl RankingRule for ByTotalDuration {
    fn name(&self) -> &'static str {
        "TOTAL_DURATION"
    }

    fn rank(&self, _schedule: &Schedule, instance: &Instance) -> Vec<String> {
        rank_by_key(instance, |j| -instance.jobs()[j].total_duration())
    }
}

/// Ranks jobs by completion time under the schedule, earliest first.
///
/// Jobs absent from the schedule rank last.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByCompletion;

impl RankingRule for ByCompletion {
    fn name(&self) -> &'static str {
        "COMPLETION"
    }

    fn rank(&self, schedule: &Schedule, instance: &Instance) -> Vec<String> {
        rank_by_key(instance, |j| {
            schedule
                .job_completion_time(&instance.jobs()[j].id)
                .unwrap_or(i64::MAX)
        })
    }
}

/// Ranks jobs by deadline slack (deadline minus completion), tightest first.
///
/// Jobs without a deadline rank last.
#[derive(Debug, Clone, Copy, Default)]
pub struct BySlack;

impl RankingRule for BySlack {
    fn name(&self) -> &'static str {
        "SLACK"
    }

    fn rank(&self, schedule: &Schedule, instance: &Instance) -> Vec<String> {
        rank_by_key(instance, |j| {
            let job = &instance.jobs()[j];
            match (job.deadline, schedule.job_completion_time(&job.id)) {
                (Some(deadline), Some(completion)) => deadline - completion,
                _ => i64::MAX,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::TaskRecord;
    use crate::models::Assignment;

    fn sample() -> (Instance, Schedule) {
        let instance = Instance::build(&[
            TaskRecord::new("J1", 0, "M1", 2).with_deadline(10),
            TaskRecord::new("J2", 0, "M2", 5).with_deadline(5),
            TaskRecord::new("J3", 0, "M3", 3),
        ])
        .unwrap();
        let mut schedule = Schedule::new();
        schedule.add_assignment(Assignment::new("J1", 0, "M1", 0, 2));
        schedule.add_assignment(Assignment::new("J2", 0, "M2", 0, 5));
        schedule.add_assignment(Assignment::new("J3", 0, "M3", 0, 3));
        (instance, schedule)
    }

    #[test]
    fn test_by_total_duration() {
        let (inst, sched) = sample();
        let ranking = ByTotalDuration.rank(&sched, &inst);
        assert_eq!(ranking, vec!["J2", "J3", "J1"]);
    }

    #[test]
    fn test_by_completion() {
        let (inst, sched) = sample();
        let ranking = ByCompletion.rank(&sched, &inst);
        assert_eq!(ranking, vec!["J1", "J3", "J2"]);
    }

    #[test]
    fn test_by_slack() {
        let (inst, sched) = sample();
        // J1 slack 8, J2 slack 0, J3 no deadline → last.
        let ranking = BySlack.rank(&sched, &inst);
        assert_eq!(ranking, vec!["J2", "J1", "J3"]);
    }

    #[test]
    fn test_ties_keep_job_id_order() {
        let instance = Instance::build(&[
            TaskRecord::new("B", 0, "M1", 3),
            TaskRecord::new("A", 0, "M2", 3),
        ])
        .unwrap();
        let ranking = ByTotalDuration.rank(&Schedule::new(), &instance);
        assert_eq!(ranking, vec!["A", "B"]);
    }

    #[test]
    fn test_empty_instance() {
        let instance = Instance::build(&[]).unwrap();
        assert!(ByTotalDuration.rank(&Schedule::new(), &instance).is_empty());
    }
}
