//! Greedy list scheduler.
//!
//! # Algorithm
//!
//! Repeatedly picks, among the next unscheduled task of every job, the one
//! that can start earliest (given job readiness and machine availability),
//! tie-breaking by job order. The result is always feasible: precedence and
//! mutual exclusion hold by construction. It is not optimal; the search
//! engine uses it as its initial incumbent so even a near-zero budget
//! returns a valid schedule.
//!
//! # Complexity
//! O(n²) over tasks, negligible next to the search itself.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use crate::analytics::extract_schedule;
use crate::instance::Instance;
use crate::models::Schedule;

/// Earliest-start greedy scheduler.
///
/// # Example
///
/// ```
/// use jobshop_engine::greedy::GreedyScheduler;
/// use jobshop_engine::instance::{Instance, TaskRecord};
///
/// let instance = Instance::build(&[
///     TaskRecord::new("J1", 0, "M1", 3),
///     TaskRecord::new("J2", 0, "M1", 2),
/// ])
/// .unwrap();
/// let schedule = GreedyScheduler::new().schedule(&instance);
/// assert_eq!(schedule.assignment_count(), 2);
/// assert_eq!(schedule.makespan(), 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GreedyScheduler;

impl GreedyScheduler {
    /// Creates a new scheduler.
    pub fn new() -> Self {
        Self
    }

    /// Builds a feasible schedule for the instance.
    pub fn schedule(&self, instance: &Instance) -> Schedule {
        extract_schedule(instance, &self.starts(instance))
    }

    /// Start time per flat task index.
    pub(crate) fn starts(&self, instance: &Instance) -> Vec<i64> {
        let flat = instance.flat();
        let job_count = instance.jobs().len();

        let mut starts = vec![0i64; flat.len()];
        let mut machine_free = vec![0i64; instance.machines().len()];
        let mut job_ready = vec![0i64; job_count];
        let mut next_pos = vec![0usize; job_count];

        for _ in 0..flat.len() {
            // Earliest-startable next task across jobs; ties go to the
            // lowest job index (jobs are in sorted id order).
            let mut chosen_job = usize::MAX;
            let mut chosen_start = i64::MAX;
            for job in 0..job_count {
                let tasks = instance.job_task_indices(job);
                if next_pos[job] >= tasks.len() {
                    continue;
                }
                let t = tasks[next_pos[job]];
                let start = job_ready[job].max(machine_free[flat[t].machine]);
                if start < chosen_start {
                    chosen_start = start;
                    chosen_job = job;
                }
            }

            let t = instance.job_task_indices(chosen_job)[next_pos[chosen_job]];
            let end = chosen_start + flat[t].duration;
            starts[t] = chosen_start;
            machine_free[flat[t].machine] = end;
            job_ready[chosen_job] = end;
            next_pos[chosen_job] += 1;
        }

        starts
    }
}
